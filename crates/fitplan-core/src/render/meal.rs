use super::labels::Labels;
use super::layout::Layout;
use super::{LineStyle, joined};
use crate::model::{BudgetLevel, MealPlan};

pub(super) fn summary(plan: &MealPlan, labels: &Labels) -> String {
    let prefs = &plan.preferences;
    let budget = match prefs.budget_level {
        BudgetLevel::Low => labels.budget_levels[0],
        BudgetLevel::Medium => labels.budget_levels[1],
        BudgetLevel::High => labels.budget_levels[2],
    };
    let mut line = [
        labels.qualify(prefs.meals_per_day, labels.meals_per_day),
        labels.qualify(prefs.cooking_time.method(), labels.cooking),
        labels.qualify(budget, labels.budget),
    ]
    .join(" | ");
    for extra in [&prefs.diet_style, &prefs.cuisine, &prefs.goal].into_iter().flatten() {
        line.push_str(" | ");
        line.push_str(extra);
    }
    line
}

pub(super) fn days(layout: &mut Layout<'_>, plan: &MealPlan, labels: &Labels) {
    for day in &plan.days {
        layout.gap();
        layout.line(LineStyle::Heading, 0, format!("{} {}", labels.day, day.day));
        layout.line(LineStyle::Muted, 1, format!("{}: {}", labels.target, day.target));
        layout.line(LineStyle::Muted, 1, format!("{}: {}", labels.actual, day.actual));

        for meal in &day.meals {
            layout.line(LineStyle::Subheading, 1, format!("{}: {}", meal.label, meal.name));
            layout.line(LineStyle::Body, 2, meal.macros.to_string());
            for ingredient in &meal.ingredients {
                layout.line(
                    LineStyle::Body,
                    2,
                    format!("- {} ({})", ingredient.name, ingredient.amount),
                );
            }
            for (i, step) in meal.instructions.iter().enumerate() {
                layout.line(LineStyle::Body, 2, format!("{}. {step}", i + 1));
            }
            if let Some(subs) = joined(&meal.substitutions) {
                layout.line(LineStyle::Muted, 2, format!("{}: {subs}", labels.substitutions));
            }
        }
    }
}

pub(super) fn shopping_list(layout: &mut Layout<'_>, plan: &MealPlan, labels: &Labels) {
    if plan.shopping_list.is_empty() {
        return;
    }
    layout.gap();
    layout.line(LineStyle::Heading, 0, labels.shopping_list);
    for category in &plan.shopping_list {
        layout.line(LineStyle::Subheading, 1, &category.category);
        for item in &category.items {
            layout.line(LineStyle::Body, 2, format!("- {}: {}", item.name, item.amount));
        }
    }
}
