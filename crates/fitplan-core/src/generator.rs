//! The `PlanGenerator` trait -- the seam to the external plan generator.
//!
//! The generator is a black box (typically a language model behind some
//! transport). It receives a typed request and answers with either
//! structured JSON or raw text; nothing it returns is trusted until it has
//! passed [`crate::candidate::validate`].

use anyhow::Result;
use async_trait::async_trait;
use fitplan_db::models::PlanKind;
use serde_json::Value;

use crate::model::{MealPlanRequest, WorkoutPlanRequest};

/// What the generator is asked to produce.
#[derive(Debug, Clone, Copy)]
pub enum GenerationRequest<'a> {
    Meal(&'a MealPlanRequest),
    Workout(&'a WorkoutPlanRequest),
}

impl GenerationRequest<'_> {
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Meal(_) => PlanKind::Meal,
            Self::Workout(_) => PlanKind::Workout,
        }
    }
}

/// Raw generator answer.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutput {
    /// Already-parsed JSON (e.g. from a JSON-mode API).
    Structured(Value),
    /// Free text that should contain a JSON document.
    Text(String),
}

/// Adapter interface for external plan generators.
///
/// # Object Safety
///
/// This trait is object-safe so the service can hold an
/// `Arc<dyn PlanGenerator>` chosen at startup.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Identity recorded in the plan's meta block (e.g. a model name).
    fn name(&self) -> &str;

    /// Prompt or model version recorded alongside [`PlanGenerator::name`].
    fn version(&self) -> &str;

    /// Produce one candidate plan.
    ///
    /// An `Err` means the call itself failed (transport, process exit). Bad
    /// content is returned as `Ok` and rejected later by validation.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<GeneratorOutput>;
}

// Compile-time assertion: PlanGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
