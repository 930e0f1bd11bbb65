//! Weekly shopping list aggregation.

use crate::catalog::{CategoryRule, OTHER_CATEGORY};
use crate::model::{DayPlan, ShoppingCategory, ShoppingItem};

/// Amount shown when one ingredient appears with differing amounts.
pub const MIXED_AMOUNT: &str = "1x";

/// Deduplicate every ingredient across `days` and group the result by
/// category.
///
/// Names are unique across the whole list and keep first-seen order within a
/// category. An item gets its observed amount when every occurrence agrees,
/// and [`MIXED_AMOUNT`] otherwise.
///
/// Classification checks the lowercased name against each rule's keywords in
/// `rules` order; the first rule with a keyword contained in the name wins.
/// Unmatched items go to [`OTHER_CATEGORY`], listed last. Rules with the same
/// name feed one category, and a rule named [`OTHER_CATEGORY`] feeds the
/// catch-all, so no category name appears twice. Categories with no items are
/// left out.
pub fn aggregate(days: &[DayPlan], rules: &[CategoryRule]) -> Vec<ShoppingCategory> {
    // (name, amounts in order of appearance)
    let mut seen: Vec<(&str, Vec<&str>)> = Vec::new();
    for ingredient in days
        .iter()
        .flat_map(|d| &d.meals)
        .flat_map(|m| &m.ingredients)
    {
        let amount = ingredient.amount.as_str();
        match seen.iter().position(|(name, _)| *name == ingredient.name) {
            Some(i) => seen[i].1.push(amount),
            None => seen.push((ingredient.name.as_str(), vec![amount])),
        }
    }

    // Rules sharing a name share one category; `Other` is always the
    // catch-all and always last.
    let mut grouped: Vec<ShoppingCategory> = Vec::new();
    let mut slots: Vec<Option<usize>> = Vec::with_capacity(rules.len());
    for rule in rules {
        if rule.name == OTHER_CATEGORY {
            slots.push(None);
            continue;
        }
        let slot = match grouped.iter().position(|c| c.category == rule.name) {
            Some(i) => i,
            None => {
                grouped.push(ShoppingCategory {
                    category: rule.name.clone(),
                    items: Vec::new(),
                });
                grouped.len() - 1
            }
        };
        slots.push(Some(slot));
    }
    grouped.push(ShoppingCategory {
        category: OTHER_CATEGORY.to_owned(),
        items: Vec::new(),
    });
    let other = grouped.len() - 1;

    for (name, amounts) in seen {
        let slot = classify(name, rules).and_then(|r| slots[r]).unwrap_or(other);
        grouped[slot].items.push(ShoppingItem {
            name: name.to_owned(),
            amount: combined_amount(&amounts),
        });
    }

    grouped.retain(|c| !c.items.is_empty());
    grouped
}

fn classify(name: &str, rules: &[CategoryRule]) -> Option<usize> {
    let name = name.to_lowercase();
    rules.iter().position(|rule| {
        rule.keywords
            .iter()
            .any(|k| name.contains(k.to_lowercase().as_str()))
    })
}

fn combined_amount(amounts: &[&str]) -> String {
    match amounts.split_first() {
        Some((first, rest)) if rest.iter().all(|a| a == first) => (*first).to_owned(),
        _ => MIXED_AMOUNT.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::Catalog;
    use crate::model::{Ingredient, Macros, MealSlot};

    fn day(n: u32, ingredients: &[(&str, &str)]) -> DayPlan {
        DayPlan {
            day: n,
            target: Macros::default(),
            actual: Macros::default(),
            meals: vec![MealSlot {
                label: "Lunch".to_owned(),
                name: format!("Lunch Option {n}"),
                macros: Macros::default(),
                ingredients: ingredients
                    .iter()
                    .map(|(name, amount)| Ingredient::new(*name, *amount))
                    .collect(),
                instructions: vec![],
                substitutions: vec![],
            }],
        }
    }

    fn names(list: &[ShoppingCategory]) -> Vec<(&str, Vec<&str>)> {
        list.iter()
            .map(|c| {
                (
                    c.category.as_str(),
                    c.items.iter().map(|i| i.name.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn groups_by_first_matching_category() {
        let rules = Catalog::builtin().categories;
        let days = [
            day(1, &[("Chicken breast", "150g"), ("Brown rice", "100g")]),
            day(2, &[("Peanut butter", "1 tbsp"), ("Almonds", "30g")]),
            day(3, &[("Mixed vegetables", "200g"), ("Chicken breast", "150g")]),
        ];

        let list = aggregate(&days, &rules);
        assert_eq!(
            names(&list),
            [
                ("Protein", vec!["Chicken breast"]),
                ("Vegetables", vec!["Mixed vegetables"]),
                ("Carbs", vec!["Brown rice"]),
                ("Dairy", vec!["Peanut butter"]),
                ("Other", vec!["Almonds"]),
            ]
        );
        // Agreeing amounts survive.
        assert_eq!(list[0].items[0].amount, "150g");
    }

    #[test]
    fn differing_amounts_collapse_to_placeholder() {
        let days = [day(1, &[("Oats", "50g")]), day(2, &[("Oats", "80g")])];
        let list = aggregate(&days, &[]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].category, OTHER_CATEGORY);
        assert_eq!(list[0].items[0].amount, MIXED_AMOUNT);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let rules = vec![CategoryRule {
            name: "Protein".to_owned(),
            keywords: vec!["TOFU".to_owned()],
        }];
        let list = aggregate(&[day(1, &[("Smoked tofu", "100g")])], &rules);
        assert_eq!(names(&list), [("Protein", vec!["Smoked tofu"])]);
    }

    #[test]
    fn no_days_gives_empty_list() {
        assert!(aggregate(&[], &Catalog::builtin().categories).is_empty());
    }

    #[test]
    fn every_ingredient_listed_exactly_once() {
        let rules = Catalog::builtin().categories;
        let days = [
            day(1, &[("Eggs", "2 pieces"), ("Salmon", "150g"), ("Apple", "1 medium")]),
            day(2, &[("Salmon", "200g"), ("Eggs", "2 pieces"), ("Banana", "1 medium")]),
        ];
        let list = aggregate(&days, &rules);

        let listed: Vec<&str> = list
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.name.as_str()))
            .collect();
        let unique: HashSet<&str> = listed.iter().copied().collect();
        assert_eq!(listed.len(), unique.len());

        let used: HashSet<&str> = days
            .iter()
            .flat_map(|d| &d.meals)
            .flat_map(|m| &m.ingredients)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(unique, used);
        assert_eq!(list.last().map(|c| c.category.as_str()), Some("Other"));
    }

    #[test]
    fn rules_sharing_a_name_share_a_category() {
        let rule = |name: &str, keyword: &str| CategoryRule {
            name: name.to_owned(),
            keywords: vec![keyword.to_owned()],
        };
        let rules = [rule("Protein", "egg"), rule("Protein", "tofu"), rule("Other", "oat")];
        let days = [day(1, &[("Eggs", "2"), ("Tofu", "100g"), ("Oats", "50g"), ("Kale", "1 bunch")])];

        let list = aggregate(&days, &rules);
        assert_eq!(
            names(&list),
            [
                ("Protein", vec!["Eggs", "Tofu"]),
                ("Other", vec!["Oats", "Kale"]),
            ]
        );
    }
}
