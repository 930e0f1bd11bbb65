//! Error taxonomy for plan generation.
//!
//! Every variant is local to one request and never retried here; callers
//! decide on retry. The variants stay distinct so a caller can tell "your
//! input is wrong" from "the generator produced garbage" from "you already
//! have a plan" from "we could not save".

use fitplan_db::models::PlanKind;
use thiserror::Error;

use crate::candidate::CandidateError;

/// Errors surfaced by [`crate::service::PlanService`] and the store.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Preferences or targets are missing or out of range.
    #[error("invalid input: {0}")]
    Input(String),

    /// External generator output failed the structural gate.
    #[error("generated plan was rejected ({0}); try generating again")]
    Validation(#[from] CandidateError),

    /// A business rule refused the request before generation started.
    #[error("user {user_id} already has a {kind} plan; only one is allowed")]
    Policy { user_id: i64, kind: PlanKind },

    /// The version store could not be read or written.
    #[error("plan storage failed: {0:#}")]
    Persistence(#[source] anyhow::Error),

    /// The external generator call itself failed.
    #[error("plan generator {generator:?} failed: {source:#}")]
    Generator {
        generator: String,
        #[source]
        source: anyhow::Error,
    },

    /// A plan kind needs a generator and none is configured.
    #[error("no plan generator is configured for {0} plans")]
    GeneratorUnavailable(PlanKind),
}

impl PlanError {
    /// Shorthand for an [`PlanError::Input`] with a formatted message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Short machine-readable label for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input(_) => "invalid_input",
            Self::Validation(_) => "validation_failed",
            Self::Policy { .. } => "policy_violation",
            Self::Persistence(_) => "persistence_failed",
            Self::Generator { .. } => "generator_failed",
            Self::GeneratorUnavailable(_) => "generator_unavailable",
        }
    }
}
