//! CLI handlers for `fitplan plan` subcommands.
//!
//! Implements:
//! - `fitplan plan generate-meal`     -- generate a week of meals
//! - `fitplan plan regenerate-day`    -- rebuild one day of a meal plan
//! - `fitplan plan generate-workout`  -- generate a workout plan
//! - `fitplan plan latest`            -- show the newest stored plan
//! - `fitplan plan history`           -- list stored versions
//! - `fitplan plan render`            -- write the paginated document

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;

use fitplan_core::model::{
    DayPlan, Language, MealPlan, MealPlanRequest, NutritionTargets, Plan, PlanPreferences, WorkoutPlan,
    WorkoutPlanRequest, WorkoutPreferences,
};
use fitplan_core::render::RenderOptions;
use fitplan_core::{DayRegeneration, GenerationOutcome, PlanService};
use fitplan_db::models::PlanKind;

use crate::PlanCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, service: &PlanService) -> Result<()> {
    match command {
        PlanCommands::GenerateMeal {
            user,
            request,
            calories,
            protein,
            carbs,
            fat,
            meals_per_day,
            language,
            json,
        } => {
            let request = meal_request(
                request.as_deref(),
                [calories, protein, carbs, fat],
                meals_per_day,
                language.as_deref(),
            )?;
            let outcome = service.generate_meal_plan(user, &request).await?;
            print_outcome(&outcome, json)
        }
        PlanCommands::RegenerateDay {
            user,
            day,
            request,
            calories,
            protein,
            carbs,
            fat,
            meals_per_day,
            language,
            json,
        } => {
            let request = meal_request(
                request.as_deref(),
                [calories, protein, carbs, fat],
                meals_per_day,
                language.as_deref(),
            )?;
            let regen = service.regenerate_meal_day(user, day, &request).await?;
            print_regeneration(&regen, json)
        }
        PlanCommands::GenerateWorkout {
            user,
            request,
            days,
            experience,
            language,
            json,
        } => {
            let request = match request {
                Some(path) => read_request::<WorkoutPlanRequest>(&path)?,
                None => {
                    let mut preferences = WorkoutPreferences::default();
                    if let Some(level) = experience.as_deref() {
                        preferences.experience = parse_choice("--experience", level)?;
                    }
                    if let Some(lang) = language.as_deref() {
                        preferences.language = parse_choice("--language", lang)?;
                    }
                    WorkoutPlanRequest {
                        day_count: days.unwrap_or(preferences.days_per_week),
                        preferences,
                    }
                }
            };
            let outcome = service.generate_workout_plan(user, &request).await?;
            print_outcome(&outcome, json)
        }
        PlanCommands::Latest { user, kind, json } => cmd_latest(service, user, kind, json).await,
        PlanCommands::History { user, kind } => cmd_history(service, user, kind).await,
        PlanCommands::Render { user, kind, output } => {
            cmd_render(service, user, kind, output.as_deref()).await
        }
    }
}

/// A meal request from `--request`, or from the target and preference flags.
fn meal_request(
    path: Option<&str>,
    [calories, protein, carbs, fat]: [Option<f64>; 4],
    meals_per_day: Option<u32>,
    language: Option<&str>,
) -> Result<MealPlanRequest> {
    if let Some(path) = path {
        return read_request(path);
    }
    let targets = NutritionTargets::new(
        calories.context("--calories is required")?,
        protein.context("--protein is required")?,
        carbs.context("--carbs is required")?,
        fat.context("--fat is required")?,
    );
    let mut preferences = PlanPreferences::default();
    if let Some(n) = meals_per_day {
        preferences.meals_per_day = n;
    }
    if let Some(lang) = language {
        preferences.language = parse_choice::<Language>("--language", lang)?;
    }
    Ok(MealPlanRequest::new(preferences, targets))
}

fn read_request<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file: {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse request file: {path}"))
}

/// Parse a flag value into one of the snake_case request enums.
fn parse_choice<T: DeserializeOwned>(flag: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_owned()))
        .map_err(|_| anyhow!("invalid value {value:?} for {flag}"))
}

// -----------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------

fn print_outcome(outcome: &GenerationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let meta = outcome.plan.meta();
    println!(
        "{} plan generated by {} ({}).",
        capitalize(outcome.plan.kind().as_str()),
        meta.generator,
        meta.generator_version
    );
    match (&outcome.record, &outcome.persistence_error) {
        (Some(record), _) => println!("  Saved as version {} (active)", record.version),
        (None, Some(err)) => println!("  Not saved: {err}"),
        (None, None) => println!("  Not saved"),
    }
    println!();
    print_plan(&outcome.plan);
    Ok(())
}

fn print_regeneration(regen: &DayRegeneration, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(regen)?);
        return Ok(());
    }

    match (&regen.record, &regen.persistence_error) {
        (Some(record), _) => println!(
            "Day {} regenerated. Saved as version {} (active)",
            regen.day.day, record.version
        ),
        (None, Some(err)) => println!("Day {} regenerated. Not saved: {err}", regen.day.day),
        (None, None) => println!(
            "Day {} regenerated. No stored meal plan to update; not saved",
            regen.day.day
        ),
    }
    println!();
    print_day(&regen.day);
    Ok(())
}

fn print_plan(plan: &Plan) {
    match plan {
        Plan::Meal(p) => print_meal_plan(p),
        Plan::Workout(p) => print_workout_plan(p),
    }
}

fn print_meal_plan(plan: &MealPlan) {
    for day in &plan.days {
        print_day(day);
    }
    if !plan.shopping_list.is_empty() {
        println!();
        println!("Shopping list:");
        for category in &plan.shopping_list {
            let items: Vec<String> = category
                .items
                .iter()
                .map(|i| format!("{} {}", i.name, i.amount))
                .collect();
            println!("  {}: {}", category.category, items.join(", "));
        }
    }
}

fn print_day(day: &DayPlan) {
    println!("Day {}  target {}  actual {}", day.day, day.target, day.actual);
    for meal in &day.meals {
        println!("  {:<10} {}  ({})", meal.label, meal.name, meal.macros);
    }
}

fn print_workout_plan(plan: &WorkoutPlan) {
    for block in &plan.days {
        println!("Day {}  {}  ({})", block.day, block.label, block.focus);
        for exercise in &block.exercises {
            println!(
                "  {:<24} {} x {}  rest {}",
                exercise.name, exercise.sets, exercise.reps, exercise.rest
            );
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// -----------------------------------------------------------------------
// fitplan plan latest
// -----------------------------------------------------------------------

async fn cmd_latest(service: &PlanService, user: i64, kind: PlanKind, json: bool) -> Result<()> {
    let Some((record, plan)) = service.latest(user, kind).await? else {
        println!("No {kind} plan found for user {user}.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} plan v{} for user {} ({}, created {})",
        capitalize(kind.as_str()),
        record.version,
        user,
        if record.active { "active" } else { "inactive" },
        record.created_at.format("%Y-%m-%d %H:%M UTC"),
    );
    println!();
    print_plan(&plan);
    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan history
// -----------------------------------------------------------------------

async fn cmd_history(service: &PlanService, user: i64, kind: PlanKind) -> Result<()> {
    let versions = service.history(user, kind).await?;

    if versions.is_empty() {
        println!("No {kind} plans found for user {user}.");
        return Ok(());
    }

    println!("{:<8}  {:<6}  CREATED", "VERSION", "ACTIVE");
    println!("{}", "-".repeat(36));
    for v in &versions {
        println!(
            "{:<8}  {:<6}  {}",
            v.version,
            if v.active { "yes" } else { "" },
            v.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan render
// -----------------------------------------------------------------------

async fn cmd_render(
    service: &PlanService,
    user: i64,
    kind: PlanKind,
    output: Option<&str>,
) -> Result<()> {
    let document = service
        .render_latest(user, kind, &RenderOptions::default())
        .await?
        .with_context(|| format!("no {kind} plan found for user {user}"))?;

    match output {
        Some(path) => {
            std::fs::write(path, document.to_bytes())
                .with_context(|| format!("failed to write document to {path}"))?;
            println!(
                "Rendered {} page(s) to {path}",
                document.page_count()
            );
        }
        None => print!("{}", document.to_text()),
    }
    Ok(())
}
