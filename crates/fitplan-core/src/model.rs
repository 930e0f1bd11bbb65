//! Plan data model shared by the generators, validator, store and renderer.
//!
//! Everything here is plain serde data. A plan is stored as the JSON
//! serialization of [`Plan`] and must deserialize back to the same value.

use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use chrono::{DateTime, Utc};
use fitplan_db::models::PlanKind;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PlanError;

/// Meal plans always span one week.
pub const MEAL_PLAN_DAYS: u32 = 7;

/// Labels assigned to meal slots, in order; a day uses a prefix of this list.
pub const SLOT_LABELS: [&str; 5] = ["Breakfast", "Lunch", "Dinner", "Snack", "Snack 2"];

/// Upper bound on workout plan length accepted from callers.
pub const MAX_WORKOUT_DAYS: u32 = 28;

// ---------------------------------------------------------------------------
// Preference enums
// ---------------------------------------------------------------------------

/// How much time the user is willing to spend cooking one meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingTime {
    #[default]
    Quick,
    Medium,
    Advanced,
}

impl CookingTime {
    /// Human label for the cooking method.
    pub fn method(self) -> &'static str {
        match self {
            Self::Quick => "Quick",
            Self::Medium => "Moderate",
            Self::Advanced => "Detailed",
        }
    }

    /// Upper bound on total cooking time, in minutes.
    pub fn max_minutes(self) -> u32 {
        match self {
            Self::Quick => 20,
            Self::Medium => 35,
            Self::Advanced => 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Output language of generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Disclaimer printed at the end of every plan.
    pub fn disclaimer(self) -> &'static str {
        match self {
            Self::En => {
                "This plan is general guidance, not medical advice. \
                 Consult a professional if you have a condition."
            }
            Self::Ar => {
                "هذه الخطة للاسترشاد العام وليست نصيحة طبية. استشر مختصاً إذا لديك حالة صحية."
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        })
    }
}

/// Health conditions that shape a meal plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthFlags {
    pub diabetes: bool,
    pub obesity: bool,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Meal plan preferences. Immutable input to generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPreferences {
    pub meals_per_day: u32,
    pub cooking_time: CookingTime,
    pub budget_level: BudgetLevel,
    pub diet_style: Option<String>,
    pub cuisine: Option<String>,
    pub liked_foods: BTreeSet<String>,
    pub disliked_foods: BTreeSet<String>,
    pub allergies: BTreeSet<String>,
    /// Overrides the goal on the user's profile when set.
    pub goal: Option<String>,
    pub language: Language,
    pub health: HealthFlags,
}

impl Default for PlanPreferences {
    fn default() -> Self {
        Self {
            meals_per_day: 4,
            cooking_time: CookingTime::default(),
            budget_level: BudgetLevel::default(),
            diet_style: None,
            cuisine: None,
            liked_foods: BTreeSet::new(),
            disliked_foods: BTreeSet::new(),
            allergies: BTreeSet::new(),
            goal: None,
            language: Language::default(),
            health: HealthFlags::default(),
        }
    }
}

impl PlanPreferences {
    /// Slot labels for one day: the first `meals_per_day` entries of
    /// [`SLOT_LABELS`], never fewer than one nor more than five.
    pub fn slot_labels(&self) -> &'static [&'static str] {
        let count = (self.meals_per_day as usize).clamp(1, SLOT_LABELS.len());
        &SLOT_LABELS[..count]
    }
}

/// Daily nutrition targets. All four macros are required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_liters: Option<f64>,
}

impl NutritionTargets {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            water_liters: None,
        }
    }

    /// Reject negative or non-finite values.
    pub fn check(&self) -> Result<(), PlanError> {
        let fields = [
            ("calories", Some(self.calories)),
            ("protein", Some(self.protein)),
            ("carbs", Some(self.carbs)),
            ("fat", Some(self.fat)),
            ("water_liters", self.water_liters),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(PlanError::input(format!(
                        "target {name} must be a non-negative number, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The targets as whole units, truncated.
    pub fn as_macros(&self) -> Macros {
        Macros {
            calories: self.calories as i64,
            protein: self.protein as i64,
            carbs: self.carbs as i64,
            fat: self.fat as i64,
        }
    }
}

/// Request for a meal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanRequest {
    #[serde(default)]
    pub preferences: PlanPreferences,
    pub targets: NutritionTargets,
    #[serde(default = "default_meal_days")]
    pub day_count: u32,
}

fn default_meal_days() -> u32 {
    MEAL_PLAN_DAYS
}

impl MealPlanRequest {
    pub fn new(preferences: PlanPreferences, targets: NutritionTargets) -> Self {
        Self {
            preferences,
            targets,
            day_count: MEAL_PLAN_DAYS,
        }
    }

    pub fn check(&self) -> Result<(), PlanError> {
        if self.preferences.meals_per_day < 1 {
            return Err(PlanError::input("meals_per_day must be at least 1"));
        }
        if self.day_count != MEAL_PLAN_DAYS {
            return Err(PlanError::input(format!(
                "meal plans span exactly {MEAL_PLAN_DAYS} days, got day_count {}",
                self.day_count
            )));
        }
        self.targets.check()
    }
}

/// Training preferences for a workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutPreferences {
    pub experience: Experience,
    pub days_per_week: u32,
    pub split: String,
    pub equipment: String,
    pub focus: String,
    pub injuries: Option<String>,
    pub language: Language,
}

impl Default for WorkoutPreferences {
    fn default() -> Self {
        Self {
            experience: Experience::default(),
            days_per_week: 4,
            split: "push_pull_legs".to_owned(),
            equipment: "gym".to_owned(),
            focus: "muscle_gain".to_owned(),
            injuries: None,
            language: Language::default(),
        }
    }
}

/// Request for a workout plan of `day_count` training days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlanRequest {
    #[serde(default)]
    pub preferences: WorkoutPreferences,
    pub day_count: u32,
}

impl WorkoutPlanRequest {
    pub fn check(&self) -> Result<(), PlanError> {
        if !(1..=MAX_WORKOUT_DAYS).contains(&self.day_count) {
            return Err(PlanError::input(format!(
                "day_count must be between 1 and {MAX_WORKOUT_DAYS}, got {}",
                self.day_count
            )));
        }
        if !(2..=7).contains(&self.preferences.days_per_week) {
            return Err(PlanError::input(format!(
                "days_per_week must be between 2 and 7, got {}",
                self.preferences.days_per_week
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Plan structure
// ---------------------------------------------------------------------------

/// Calories and macronutrients in whole units (kcal, grams).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::default(), Add::add)
    }
}

impl fmt::Display for Macros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal | P {}g | C {}g | F {}g",
            self.calories, self.protein, self.carbs, self.fat
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }
}

/// One meal within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSlot {
    /// Breakfast, Lunch, Dinner, Snack, ...
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub macros: Macros,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, alias = "alternatives")]
    pub substitutions: Vec<String>,
}

/// One day of a meal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based.
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub target: Macros,
    /// Sum of the slot macros.
    #[serde(default)]
    pub actual: Macros,
    pub meals: Vec<MealSlot>,
}

impl DayPlan {
    /// Recompute `actual` from the slots.
    pub fn refresh_actual(&mut self) {
        self.actual = self.meals.iter().map(|m| m.macros).sum();
    }
}

/// Provenance block carried by every plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMeta {
    pub created_at: DateTime<Utc>,
    /// Identity of whatever produced the plan (model name, `mock-planner`).
    pub generator: String,
    pub generator_version: String,
    pub language: Language,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCategory {
    pub category: String,
    pub items: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub meta: PlanMeta,
    pub preferences: PlanPreferences,
    pub targets: NutritionTargets,
    pub days: Vec<DayPlan>,
    pub shopping_list: Vec<ShoppingCategory>,
}

/// One prescribed exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sets: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub reps: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rest: String,
    #[serde(default)]
    pub tempo: Option<String>,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// At least two on anything that passed candidate validation.
    #[serde(default, alias = "alternatives")]
    pub substitutions: Vec<String>,
}

/// One training day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseBlock {
    /// 1-based.
    #[serde(default)]
    pub day: u32,
    pub label: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub warm_up: Vec<String>,
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub cool_down: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub meta: PlanMeta,
    pub preferences: WorkoutPreferences,
    pub days: Vec<ExerciseBlock>,
}

/// A stored plan of either kind. Serialized with a `kind` tag, which is the
/// shape persisted in `plan_versions.payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    Meal(MealPlan),
    Workout(WorkoutPlan),
}

impl Plan {
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Meal(_) => PlanKind::Meal,
            Self::Workout(_) => PlanKind::Workout,
        }
    }

    pub fn meta(&self) -> &PlanMeta {
        match self {
            Self::Meal(p) => &p.meta,
            Self::Workout(p) => &p.meta,
        }
    }

    pub fn day_count(&self) -> usize {
        match self {
            Self::Meal(p) => p.days.len(),
            Self::Workout(p) => p.days.len(),
        }
    }
}

/// Generators write `"sets": 4` as often as `"sets": "4"`; accept both.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}
