//! Deterministic fallback meal planner.
//!
//! Used when no external generator is configured. Given the same request,
//! catalog, timestamp and RNG state it produces the same plan.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::allocator::{DEFAULT_VARIANCE, allocate};
use super::selector::{MAX_INGREDIENTS_PER_MEAL, select};
use super::shopping::aggregate;
use crate::catalog::Catalog;
use crate::model::{BudgetLevel, DayPlan, MealPlan, MealPlanRequest, MealSlot, PlanMeta, PlanPreferences};

pub const MOCK_PLANNER: &str = "mock-planner";
pub const MOCK_PLANNER_VERSION: &str = "v1";

/// Build a full meal plan from the catalog.
///
/// Every day gets one slot per entry of [`PlanPreferences::slot_labels`],
/// with macros from [`allocate`] and ingredients from [`select`]. Each day's
/// `actual` is the sum of its slots and the shopping list covers every
/// ingredient used.
///
/// The request is not checked here; see [`MealPlanRequest::check`].
pub fn generate_meal_plan<R: Rng + ?Sized>(
    request: &MealPlanRequest,
    catalog: &Catalog,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MealPlan {
    let prefs = &request.preferences;
    let days: Vec<DayPlan> = (1..=request.day_count)
        .map(|day| generate_day(day, request, catalog, rng))
        .collect();

    let shopping_list = aggregate(&days, &catalog.categories);

    MealPlan {
        meta: PlanMeta {
            created_at: now,
            generator: MOCK_PLANNER.to_owned(),
            generator_version: MOCK_PLANNER_VERSION.to_owned(),
            language: prefs.language,
            disclaimer: prefs.language.disclaimer().to_owned(),
        },
        preferences: prefs.clone(),
        targets: request.targets,
        days,
        shopping_list,
    }
}

/// Build one day of the plan, numbered `day` (1-based).
///
/// Slots, macros and ingredients follow the same rules as
/// [`generate_meal_plan`], and `actual` is reconciled to the slot sum. Used on
/// its own to replace a single day of a stored plan.
pub fn generate_day<R: Rng + ?Sized>(
    day: u32,
    request: &MealPlanRequest,
    catalog: &Catalog,
    rng: &mut R,
) -> DayPlan {
    let prefs = &request.preferences;
    let labels = prefs.slot_labels();
    let instructions = instructions(prefs);
    let substitutions = substitutions(prefs);

    let allocation = allocate(&request.targets, labels.len(), DEFAULT_VARIANCE, rng);
    let meals = labels
        .iter()
        .zip(allocation)
        .map(|(label, macros)| MealSlot {
            label: (*label).to_owned(),
            name: format!("{label} Option {day}"),
            macros,
            ingredients: select(
                label,
                catalog,
                &prefs.disliked_foods,
                &prefs.allergies,
                MAX_INGREDIENTS_PER_MEAL,
            ),
            instructions: instructions.clone(),
            substitutions: substitutions.clone(),
        })
        .collect();

    let mut plan = DayPlan {
        day,
        target: request.targets.as_macros(),
        actual: Default::default(),
        meals,
    };
    plan.refresh_actual();
    plan
}

fn instructions(prefs: &PlanPreferences) -> Vec<String> {
    let prepare = match prefs.cuisine.as_deref().map(str::trim) {
        Some(cuisine) if !cuisine.is_empty() => {
            format!("Prepare all ingredients according to {cuisine} style")
        }
        _ => "Prepare all ingredients".to_owned(),
    };
    vec![
        prepare,
        format!(
            "Follow {} cooking method (up to {} minutes)",
            prefs.cooking_time.method(),
            prefs.cooking_time.max_minutes()
        ),
        "Season to taste and serve hot".to_owned(),
    ]
}

fn substitutions(prefs: &PlanPreferences) -> Vec<String> {
    let is = |field: &Option<String>, value: &str| {
        field
            .as_deref()
            .is_some_and(|f| f.trim().eq_ignore_ascii_case(value))
    };

    let mut out = Vec::new();
    if is(&prefs.diet_style, "vegetarian") {
        out.push("Replace meat with tofu or tempeh".to_owned());
    }
    if is(&prefs.diet_style, "low-carb") {
        out.push("Replace grains with cauliflower rice".to_owned());
    }
    if is(&prefs.cuisine, "lebanese") {
        out.push("Can substitute with other Middle Eastern options".to_owned());
    }
    if prefs.budget_level == BudgetLevel::Low {
        out.push("Swap fish or chicken for eggs or legumes to cut cost".to_owned());
    }
    out
}
