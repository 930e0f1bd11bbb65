use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::CandidateError;
use crate::model::{DayPlan, ExerciseBlock, NutritionTargets};

/// Only the day list is taken from a candidate; the service writes `meta`.
#[derive(Deserialize)]
struct Candidate<D> {
    days: Vec<D>,
}

fn coerce_days<D: DeserializeOwned>(candidate: Value) -> Result<Vec<D>, CandidateError> {
    serde_json::from_value::<Candidate<D>>(candidate)
        .map(|c| c.days)
        .map_err(|e| CandidateError::Malformed(e.to_string()))
}

/// Typed meal days from a validated candidate.
///
/// Days are renumbered from 1 in list order, every day's target is set to
/// `targets`, and `actual` is recomputed from the slots. Slot macros are
/// taken as given.
pub fn coerce_meal_days(
    candidate: Value,
    targets: &NutritionTargets,
) -> Result<Vec<DayPlan>, CandidateError> {
    let mut days: Vec<DayPlan> = coerce_days(candidate)?;
    for (i, day) in days.iter_mut().enumerate() {
        day.day = i as u32 + 1;
        day.target = targets.as_macros();
        day.refresh_actual();
    }
    Ok(days)
}

/// Typed workout days from a validated candidate, renumbered from 1.
pub fn coerce_workout_days(candidate: Value) -> Result<Vec<ExerciseBlock>, CandidateError> {
    let mut days: Vec<ExerciseBlock> = coerce_days(candidate)?;
    for (i, day) in days.iter_mut().enumerate() {
        day.day = i as u32 + 1;
    }
    Ok(days)
}
