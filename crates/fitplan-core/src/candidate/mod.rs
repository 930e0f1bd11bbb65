//! Structural gate for plans produced by an external generator.
//!
//! Generator output is untrusted. [`parse_output`] turns it into JSON,
//! [`validate`] checks the shape against a [`CandidateSchema`], and the
//! `coerce_*` functions turn an accepted value into typed days.
//!
//! ```text
//! GeneratorOutput --parse_output--> Value --validate--> Value --coerce--> days
//! ```

mod coerce;
mod schema;

use thiserror::Error;

pub use coerce::{coerce_meal_days, coerce_workout_days};
pub use schema::{ALTERNATIVES_FIELDS, CandidateSchema, DAYS_FIELD, parse_output, validate};

/// Why a candidate plan was rejected. Day and item numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("generator output is not valid JSON: {0}")]
    NotJson(String),

    #[error("candidate is not a JSON object")]
    NotAnObject,

    #[error("candidate is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` must be a list")]
    NotAList { field: String },

    #[error("expected {expected} days, got {actual}")]
    WrongDayCount { expected: usize, actual: usize },

    #[error("day {day} is not an object")]
    DayNotObject { day: usize },

    #[error("day {day} has no `{field}` list")]
    MissingItems { day: usize, field: &'static str },

    #[error("day {day} has an empty `{field}` list")]
    EmptyItems { day: usize, field: &'static str },

    #[error("day {day} has {actual} {field}, expected at least {expected}")]
    TooFewItems {
        day: usize,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("day {day} item {item} is not an object")]
    ItemNotObject { day: usize, item: usize },

    #[error("day {day} item {item} has no substitutions list")]
    MissingAlternatives { day: usize, item: usize },

    #[error("day {day} item {item} has both `substitutions` and `alternatives`; send only one")]
    ConflictingAlternatives { day: usize, item: usize },

    #[error("day {day} item {item} has {actual} substitutions, expected at least {expected}")]
    TooFewAlternatives {
        day: usize,
        item: usize,
        expected: usize,
        actual: usize,
    },

    /// Passed the shape check but does not fit the typed plan.
    #[error("candidate is malformed: {0}")]
    Malformed(String),
}
