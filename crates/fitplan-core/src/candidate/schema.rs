use fitplan_db::models::PlanKind;
use serde_json::{Map, Value};

use super::CandidateError;
use crate::generator::GeneratorOutput;

/// Top-level field holding the day list.
pub const DAYS_FIELD: &str = "days";

/// Accepted names for an item's alternatives list. An item may carry only
/// one of them; both at once is rejected by [`validate`].
pub const ALTERNATIVES_FIELDS: [&str; 2] = ["substitutions", "alternatives"];

/// Expected shape of a candidate plan of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSchema {
    pub kind: PlanKind,
    pub expected_days: usize,
    /// Field on each day holding its items (`exercises`, `meals`).
    pub items_field: &'static str,
    pub min_items_per_day: usize,
    pub min_alternatives: usize,
}

impl CandidateSchema {
    /// Workout plans: non-empty `exercises` per day, each with at least two
    /// substitutions.
    pub fn workout(expected_days: usize) -> Self {
        Self {
            kind: PlanKind::Workout,
            expected_days,
            items_field: "exercises",
            min_items_per_day: 1,
            min_alternatives: 2,
        }
    }

    /// Meal plans: at least `meals_per_day` entries in `meals` per day. The
    /// substitutions list must be present but may be empty.
    pub fn meal(expected_days: usize, meals_per_day: usize) -> Self {
        Self {
            kind: PlanKind::Meal,
            expected_days,
            items_field: "meals",
            min_items_per_day: meals_per_day.max(1),
            min_alternatives: 0,
        }
    }
}

/// Turn raw generator output into a JSON value.
///
/// Text is parsed as JSON. A single surrounding Markdown code fence is
/// tolerated since text-only generators often add one.
pub fn parse_output(output: GeneratorOutput) -> Result<Value, CandidateError> {
    match output {
        GeneratorOutput::Structured(value) => Ok(value),
        GeneratorOutput::Text(text) => serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| CandidateError::NotJson(e.to_string())),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Check `candidate` against `schema`, returning it unchanged on success.
///
/// This is a shape check only: it looks at presence, list lengths and
/// whether days and items are objects. Field types and numeric ranges are
/// left to coercion.
pub fn validate(candidate: Value, schema: &CandidateSchema) -> Result<Value, CandidateError> {
    let root = candidate.as_object().ok_or(CandidateError::NotAnObject)?;
    if !root.contains_key("meta") {
        return Err(CandidateError::MissingField("meta"));
    }
    let days = root
        .get(DAYS_FIELD)
        .ok_or(CandidateError::MissingField(DAYS_FIELD))?
        .as_array()
        .ok_or_else(|| CandidateError::NotAList {
            field: DAYS_FIELD.to_owned(),
        })?;

    if days.len() != schema.expected_days {
        return Err(CandidateError::WrongDayCount {
            expected: schema.expected_days,
            actual: days.len(),
        });
    }

    for (i, day) in days.iter().enumerate() {
        check_day(i + 1, day, schema)?;
    }
    Ok(candidate)
}

fn check_day(day_no: usize, day: &Value, schema: &CandidateSchema) -> Result<(), CandidateError> {
    let day = day
        .as_object()
        .ok_or(CandidateError::DayNotObject { day: day_no })?;
    let field = schema.items_field;
    let items = day
        .get(field)
        .ok_or(CandidateError::MissingItems { day: day_no, field })?
        .as_array()
        .ok_or_else(|| CandidateError::NotAList {
            field: format!("{DAYS_FIELD}[{day_no}].{field}"),
        })?;

    if items.is_empty() {
        return Err(CandidateError::EmptyItems { day: day_no, field });
    }
    if items.len() < schema.min_items_per_day {
        return Err(CandidateError::TooFewItems {
            day: day_no,
            field,
            expected: schema.min_items_per_day,
            actual: items.len(),
        });
    }

    for (j, item) in items.iter().enumerate() {
        let item_no = j + 1;
        let item = item.as_object().ok_or(CandidateError::ItemNotObject {
            day: day_no,
            item: item_no,
        })?;
        check_alternatives(day_no, item_no, item, schema)?;
    }
    Ok(())
}

fn check_alternatives(
    day: usize,
    item: usize,
    fields: &Map<String, Value>,
    schema: &CandidateSchema,
) -> Result<(), CandidateError> {
    let mut present = ALTERNATIVES_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name).map(|v| (*name, v)));
    let (name, value) = present
        .next()
        .ok_or(CandidateError::MissingAlternatives { day, item })?;
    if present.next().is_some() {
        return Err(CandidateError::ConflictingAlternatives { day, item });
    }
    let list = value.as_array().ok_or_else(|| CandidateError::NotAList {
        field: format!("{DAYS_FIELD}[{day}].{}[{item}].{name}", schema.items_field),
    })?;
    if list.len() < schema.min_alternatives {
        return Err(CandidateError::TooFewAlternatives {
            day,
            item,
            expected: schema.min_alternatives,
            actual: list.len(),
        });
    }
    Ok(())
}
