//! Splitting daily targets across meal slots.

use rand::Rng;

use crate::model::{Macros, NutritionTargets};

/// Default per-slot variance: each macro lands within ±10% of an even share
/// before normalization.
pub const DEFAULT_VARIANCE: f64 = 0.10;

/// Split `targets` across `slot_count` slots with bounded random variance,
/// then rescale so the slots add back up to the targets.
///
/// 1. Each slot starts from an even share (`target / slot_count`) of each
///    macro.
/// 2. Each macro of each slot is multiplied by `1 + d` with `d` drawn
///    uniformly from `[-variance, +variance]`, then truncated.
/// 3. Normalization: when the slots' calories sum to a nonzero value, every
///    macro is scaled by `target / sum` for that macro and truncated again.
///    Calories use `target_calories / summed_calories`; protein, carbs and
///    fat use their own ratios so all four daily totals reconcile.
///    Scaling every macro by the calorie ratio alone would let protein,
///    carbs and fat drift off target; keep the per-macro ratios.
///
/// After normalization each daily total is within `slot_count` units below
/// its target (one unit of truncation per slot), never above.
///
/// Returns an empty vector when `slot_count` is zero. When the calorie sum
/// is zero (e.g. a zero-calorie target) normalization is skipped and the
/// unnormalized values are returned. `variance` is clamped to `[0, 1]`.
pub fn allocate<R: Rng + ?Sized>(
    targets: &NutritionTargets,
    slot_count: usize,
    variance: f64,
    rng: &mut R,
) -> Vec<Macros> {
    if slot_count == 0 {
        return Vec::new();
    }

    let variance = if variance.is_finite() {
        variance.abs().min(1.0)
    } else {
        0.0
    };
    let n = slot_count as f64;
    let share = [
        targets.calories / n,
        targets.protein / n,
        targets.carbs / n,
        targets.fat / n,
    ];

    let mut slots: Vec<Macros> = (0..slot_count)
        .map(|_| {
            let mut jitter = |base: f64| {
                let d = rng.random_range(-variance..=variance);
                (base * (1.0 + d)) as i64
            };
            Macros {
                calories: jitter(share[0]),
                protein: jitter(share[1]),
                carbs: jitter(share[2]),
                fat: jitter(share[3]),
            }
        })
        .collect();

    let summed: Macros = slots.iter().copied().sum();
    if summed.calories == 0 {
        return slots;
    }

    let scale = |target: f64, total: i64| {
        if total == 0 {
            1.0
        } else {
            target / total as f64
        }
    };
    let scales = [
        scale(targets.calories, summed.calories),
        scale(targets.protein, summed.protein),
        scale(targets.carbs, summed.carbs),
        scale(targets.fat, summed.fat),
    ];

    for slot in &mut slots {
        slot.calories = (slot.calories as f64 * scales[0]) as i64;
        slot.protein = (slot.protein as f64 * scales[1]) as i64;
        slot.carbs = (slot.carbs as f64 * scales[2]) as i64;
        slot.fat = (slot.fat as f64 * scales[3]) as i64;
    }
    slots
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn targets() -> NutritionTargets {
        NutritionTargets::new(2000.0, 150.0, 200.0, 60.0)
    }

    /// Never above the target, and at most `slots` below its rounded value.
    fn assert_reconciled(target: f64, total: i64, slots: usize) {
        let drift = target.round() as i64 - total;
        assert!(
            total as f64 <= target + 1e-6 && (0..=slots as i64).contains(&drift),
            "total {total} drifts {drift} from target {target} (slots: {slots})"
        );
    }

    #[test]
    fn four_slots_reconcile_to_targets() {
        let mut rng = StdRng::seed_from_u64(7);
        let slots = allocate(&targets(), 4, DEFAULT_VARIANCE, &mut rng);
        assert_eq!(slots.len(), 4);

        let total: Macros = slots.iter().copied().sum();
        assert_reconciled(2000.0, total.calories, 4);
        assert_reconciled(150.0, total.protein, 4);
        assert_reconciled(200.0, total.carbs, 4);
        assert_reconciled(60.0, total.fat, 4);
        assert!(slots.iter().all(|s| s.calories >= 0));
    }

    #[test]
    fn reconciliation_holds_across_seeds_and_slot_counts() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let slot_count = (seed % 5 + 1) as usize;
            let t = NutritionTargets::new(
                1200.0 + seed as f64 * 13.7,
                80.0 + seed as f64,
                100.0 + seed as f64 * 2.0,
                40.0 + (seed % 30) as f64,
            );
            let slots = allocate(&t, slot_count, DEFAULT_VARIANCE, &mut rng);
            let total: Macros = slots.iter().copied().sum();
            assert_reconciled(t.calories, total.calories, slot_count);
            assert_reconciled(t.protein, total.protein, slot_count);
        }
    }

    #[test]
    fn variance_stays_within_bounds_before_normalization() {
        // A zero calorie target skips normalization, exposing raw values.
        let t = NutritionTargets::new(0.0, 100.0, 100.0, 100.0);
        let mut rng = StdRng::seed_from_u64(99);
        for slot in allocate(&t, 4, 0.1, &mut rng) {
            for v in [slot.protein, slot.carbs, slot.fat] {
                assert!((22..=27).contains(&v), "{v} outside ±10% of 25");
            }
        }
    }

    #[test]
    fn zero_calories_does_not_divide_by_zero() {
        let t = NutritionTargets::new(0.0, 0.0, 0.0, 0.0);
        for slot_count in 1..=5 {
            let mut rng = StdRng::seed_from_u64(slot_count as u64);
            let slots = allocate(&t, slot_count, DEFAULT_VARIANCE, &mut rng);
            assert_eq!(slots.len(), slot_count);
            assert!(slots.iter().all(|s| *s == Macros::default()));
        }
    }

    #[test]
    fn zero_slots_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(allocate(&targets(), 0, DEFAULT_VARIANCE, &mut rng).is_empty());
    }

    #[test]
    fn zero_variance_gives_even_split() {
        let mut rng = StdRng::seed_from_u64(3);
        let slots = allocate(&targets(), 4, 0.0, &mut rng);
        for slot in slots {
            assert_eq!(slot, Macros { calories: 500, protein: 37, carbs: 50, fat: 15 });
        }
    }

    #[test]
    fn same_seed_same_output() {
        let a = allocate(&targets(), 3, DEFAULT_VARIANCE, &mut StdRng::seed_from_u64(42));
        let b = allocate(&targets(), 3, DEFAULT_VARIANCE, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
