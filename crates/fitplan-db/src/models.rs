use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Discriminator between the two kinds of generated plan.
///
/// Versioning and validation rules are scoped per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Meal,
    Workout,
}

impl PlanKind {
    /// Every kind, in display order.
    pub const ALL: [PlanKind; 2] = [PlanKind::Meal, PlanKind::Workout];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Workout => "workout",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKind {
    type Err = PlanKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meal" => Ok(Self::Meal),
            "workout" => Ok(Self::Workout),
            other => Err(PlanKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlanKind`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid plan kind: {0:?} (expected meal or workout)")]
pub struct PlanKindParseError(pub String);

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row in the `plan_versions` table.
///
/// Rows are append-only: after insert only `active` ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlanVersion {
    pub id: Uuid,
    pub user_id: i64,
    pub kind: PlanKind,
    /// Positive, strictly increasing per `(user_id, kind)`.
    pub version: i32,
    pub active: bool,
    /// The full plan as generated, serialized to JSON.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_kind_round_trips_through_strings() {
        for kind in PlanKind::ALL {
            let parsed: PlanKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn plan_kind_rejects_unknown() {
        let err = "cardio".parse::<PlanKind>().unwrap_err();
        assert_eq!(err.0, "cardio");
        assert!(err.to_string().contains("meal or workout"));
    }

    #[test]
    fn plan_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PlanKind::Workout).unwrap();
        assert_eq!(json, "\"workout\"");
    }
}
