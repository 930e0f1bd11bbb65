//! Ingredient selection with dietary exclusions.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::model::Ingredient;

/// Most ingredients listed for one meal.
pub const MAX_INGREDIENTS_PER_MEAL: usize = 5;

/// Pick up to `max_items` ingredients for `slot_label` from the catalog.
///
/// The slot's bucket is used, or the catalog's default bucket when the slot
/// has none. An item is dropped when its name equals a disliked food, or
/// contains any allergy token; both comparisons ignore case. Allergy
/// matching is deliberately broader: an allergy to "nut" removes "Peanut
/// butter", a dislike of "nut" does not. Blank allergy tokens are ignored.
///
/// Catalog order is preserved.
pub fn select(
    slot_label: &str,
    catalog: &Catalog,
    dislikes: &BTreeSet<String>,
    allergies: &BTreeSet<String>,
    max_items: usize,
) -> Vec<Ingredient> {
    let dislikes: Vec<String> = dislikes.iter().map(|d| d.trim().to_lowercase()).collect();
    let allergies: Vec<String> = allergies
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();

    catalog
        .bucket(slot_label)
        .iter()
        .filter(|item| {
            let name = item.name.to_lowercase();
            !dislikes.contains(&name) && !allergies.iter().any(|a| name.contains(a.as_str()))
        })
        .take(max_items)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Bucket;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn breakfast_catalog() -> Catalog {
        Catalog {
            default_bucket: "Breakfast".to_owned(),
            buckets: vec![Bucket {
                slot: "Breakfast".to_owned(),
                items: vec![Ingredient::new("Eggs", "2"), Ingredient::new("Milk", "200ml")],
            }],
            categories: vec![],
        }
    }

    #[test]
    fn dislike_removes_exact_match_only() {
        let picked = select("Breakfast", &breakfast_catalog(), &set(&["eggs"]), &set(&[]), 5);
        assert_eq!(picked, vec![Ingredient::new("Milk", "200ml")]);
    }

    #[test]
    fn dislike_is_not_a_substring_match() {
        let catalog = Catalog::builtin();
        let picked = select("Snack 2", &catalog, &set(&["peanut"]), &set(&[]), 5);
        assert!(picked.iter().any(|i| i.name == "Peanut butter"));
    }

    #[test]
    fn allergy_is_a_substring_match() {
        let catalog = Catalog::builtin();
        let picked = select("Snack 2", &catalog, &set(&[]), &set(&["PEANUT"]), 5);
        assert_eq!(picked, vec![Ingredient::new("Banana", "1 medium")]);
    }

    #[test]
    fn blank_allergy_token_is_ignored() {
        let picked = select("Breakfast", &breakfast_catalog(), &set(&[]), &set(&["  "]), 5);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn unknown_slot_uses_default_bucket() {
        let catalog = Catalog::builtin();
        let picked = select("Pre-workout", &catalog, &set(&[]), &set(&[]), 5);
        assert_eq!(picked[0].name, "Chicken breast");
    }

    #[test]
    fn truncates_in_catalog_order() {
        let catalog = Catalog::builtin();
        let picked = select("Dinner", &catalog, &set(&[]), &set(&[]), 2);
        let names: Vec<&str> = picked.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Salmon", "Sweet potato"]);
    }

    #[test]
    fn exclusions_hold_for_every_builtin_slot() {
        let catalog = Catalog::builtin();
        let dislikes = set(&["Salmon", "apple"]);
        let allergies = set(&["egg", "ALMOND", "milk"]);
        for bucket in &catalog.buckets {
            for item in select(&bucket.slot, &catalog, &dislikes, &allergies, 10) {
                let name = item.name.to_lowercase();
                assert!(!dislikes.iter().any(|d| d.to_lowercase() == name), "{name}");
                assert!(
                    !allergies.iter().any(|a| name.contains(&a.to_lowercase())),
                    "{name}"
                );
            }
        }
    }
}
