//! Prompt construction for the external plan generator.
//!
//! Assembles a request into a prompt whose JSON contract matches what the
//! candidate validator enforces: a top-level object with `meta` and a `days`
//! list of the requested length, and a substitutions list on every item.
//! Pure string building; the generator process is spawned elsewhere.

use fitplan_core::GenerationRequest;
use fitplan_core::model::{
    BudgetLevel, Language, MealPlanRequest, PlanPreferences, WorkoutPlanRequest,
};

// ---------------------------------------------------------------------------
// Schema references
// ---------------------------------------------------------------------------

/// Meal plan JSON schema included in the prompt.
const MEAL_SCHEMA: &str = r#"## Meal Plan JSON Schema

```json
{
  "meta": { "language": "en | ar" },
  "days": [
    {
      "day": 1,
      "meals": [
        {
          "label": "Breakfast",
          "name": "string",
          "macros": { "calories": 0, "protein": 0, "carbs": 0, "fat": 0 },
          "ingredients": [ { "name": "string", "amount": "string" } ],
          "instructions": [ "string" ],
          "substitutions": [ "string" ]
        }
      ]
    }
  ]
}
```
"#;

/// Workout plan JSON schema included in the prompt.
const WORKOUT_SCHEMA: &str = r#"## Workout Plan JSON Schema

```json
{
  "meta": { "split": "string", "days_per_week": 0, "language": "en | ar" },
  "days": [
    {
      "label": "Day 1 - Push",
      "focus": "Chest, shoulders, triceps",
      "estimated_duration_minutes": 60,
      "warm_up": [ "string" ],
      "exercises": [
        {
          "name": "Bench Press",
          "sets": "4",
          "reps": "6-8",
          "rest": "90 sec",
          "tempo": "string (optional)",
          "intensity": "string (optional)",
          "notes": "string (optional)",
          "substitutions": [ "Dumbbell Press", "Push-up" ]
        }
      ],
      "cool_down": [ "string" ],
      "notes": [ "string" ]
    }
  ]
}
```
"#;

/// Coaching guidelines shared by workout prompts.
const WORKOUT_GUIDELINES: &str = r#"## Programming Guidelines

1. **Match the experience level.** Adapt difficulty, volume and exercise selection to it.
2. **Keep the split consistent** across all days.
3. **Use simple exercise names** that are easy to understand.
4. **Respect limitations.** Never program movements that load a listed injury.
"#;

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Build the full prompt for a generation request.
pub fn build_prompt(request: GenerationRequest<'_>) -> String {
    match request {
        GenerationRequest::Meal(r) => build_meal_prompt(r),
        GenerationRequest::Workout(r) => build_workout_prompt(r),
    }
}

/// Build the meal prompt: output contract, schema, rules, daily targets and
/// preferences.
pub fn build_meal_prompt(request: &MealPlanRequest) -> String {
    let prefs = &request.preferences;
    let labels = prefs.slot_labels();
    let mut prompt = String::with_capacity(4096);

    // Role and output contract.
    prompt.push_str("# Nutrition Coach\n\n");
    push_output_contract(&mut prompt, "nutrition coach");

    // Schema reference.
    prompt.push_str(MEAL_SCHEMA);
    prompt.push('\n');

    // Rules.
    prompt.push_str("## Rules\n\n");
    prompt.push_str(&format!(
        "- Generate exactly {} days (day = 1..{}).\n",
        request.day_count, request.day_count
    ));
    prompt.push_str(&format!(
        "- Each day has exactly these meals, in order: {}.\n",
        labels.join(", ")
    ));
    prompt.push_str(
        "- Every meal has a \"substitutions\" list (it may be empty).\n\
         - Meal macros should add up to the daily targets.\n",
    );
    prompt.push_str(&format!(
        "- Keep each meal under {} minutes of cooking.\n\n",
        prefs.cooking_time.max_minutes()
    ));

    // Daily targets.
    let t = &request.targets;
    prompt.push_str("## Daily Targets\n\n");
    prompt.push_str(&format!(
        "- **Calories:** {} kcal\n- **Protein:** {} g\n- **Carbs:** {} g\n- **Fat:** {} g\n",
        t.calories, t.protein, t.carbs, t.fat
    ));
    if let Some(water) = t.water_liters {
        prompt.push_str(&format!("- **Water:** {water} L\n"));
    }
    prompt.push('\n');

    // Preferences.
    prompt.push_str("## Preferences\n\n");
    push_preferences(&mut prompt, prefs);
    prompt.push('\n');

    push_language(&mut prompt, prefs.language);
    prompt
}

/// Build the workout prompt: output contract, schema, guidelines and the
/// user's training preferences.
pub fn build_workout_prompt(request: &WorkoutPlanRequest) -> String {
    let prefs = &request.preferences;
    let mut prompt = String::with_capacity(4096);

    // Role and output contract.
    prompt.push_str("# Fitness Coach\n\n");
    push_output_contract(&mut prompt, "fitness coach");

    // Schema reference.
    prompt.push_str(WORKOUT_SCHEMA);
    prompt.push('\n');

    // Guidelines.
    prompt.push_str(WORKOUT_GUIDELINES);
    prompt.push('\n');

    // Rules.
    prompt.push_str("## Rules\n\n");
    prompt.push_str(&format!(
        "- Generate exactly {} training days in \"days\"; mention rest days only in notes.\n",
        request.day_count
    ));
    prompt.push_str("- Every exercise has at least 2 entries in \"substitutions\".\n\n");

    // Training context.
    prompt.push_str("## Training Context\n\n");
    prompt.push_str(&format!("- **Experience level:** {}\n", prefs.experience));
    prompt.push_str(&format!("- **Days per week:** {}\n", prefs.days_per_week));
    prompt.push_str(&format!("- **Split style:** {}\n", prefs.split));
    prompt.push_str(&format!("- **Equipment:** {}\n", prefs.equipment));
    prompt.push_str(&format!("- **Focus:** {}\n", prefs.focus));
    match &prefs.injuries {
        Some(injuries) => {
            prompt.push_str(&format!("- **Injuries or limitations:** {injuries}\n"))
        }
        None => prompt.push_str("- **Injuries or limitations:** none\n"),
    }
    prompt.push('\n');

    push_language(&mut prompt, prefs.language);
    prompt
}

fn push_output_contract(prompt: &mut String, role: &str) {
    prompt.push_str(&format!(
        "You are a professional {role} for a mobile app. \
         Your job is to turn the user's preferences into a plan the app can store and display.\n\n"
    ));
    prompt.push_str(
        "IMPORTANT: Respond with valid JSON only. \
         Do NOT wrap it in prose or add any text before or after the JSON object.\n\n",
    );
}

fn push_preferences(prompt: &mut String, prefs: &PlanPreferences) {
    let budget = match prefs.budget_level {
        BudgetLevel::Low => "low",
        BudgetLevel::Medium => "medium",
        BudgetLevel::High => "high",
    };
    prompt.push_str(&format!("- **Budget:** {budget}\n"));
    if let Some(style) = &prefs.diet_style {
        prompt.push_str(&format!("- **Diet style:** {style}\n"));
    }
    if let Some(cuisine) = &prefs.cuisine {
        prompt.push_str(&format!("- **Cuisine:** {cuisine}\n"));
    }
    if let Some(goal) = &prefs.goal {
        prompt.push_str(&format!("- **Goal:** {goal}\n"));
    }
    let lists = [
        ("Likes", &prefs.liked_foods),
        ("Never include (dislikes)", &prefs.disliked_foods),
        ("Never include (allergies)", &prefs.allergies),
    ];
    for (label, items) in lists {
        if !items.is_empty() {
            let joined: Vec<&str> = items.iter().map(String::as_str).collect();
            prompt.push_str(&format!("- **{label}:** {}\n", joined.join(", ")));
        }
    }
    if prefs.health.diabetes {
        prompt.push_str("- **Diabetic:** prefer low glycemic carbohydrates.\n");
    }
    if prefs.health.obesity {
        prompt.push_str("- **Weight management:** prefer high-volume, low-density foods.\n");
    }
}

fn push_language(prompt: &mut String, language: Language) {
    prompt.push_str("## Language\n\n");
    match language {
        Language::En => prompt.push_str("Write everything in clear, simple English.\n"),
        Language::Ar => prompt.push_str(
            "Write all labels, notes and descriptions in Modern Standard Arabic. \
             Exercise and food names may keep the English name alongside the Arabic.\n",
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
