//! Plan generation core: macro allocation, ingredient selection, shopping
//! lists, validation of externally generated plans, versioned persistence
//! and paginated rendering.

pub mod candidate;
pub mod catalog;
pub mod error;
pub mod generator;
pub mod meal;
pub mod model;
pub mod policy;
pub mod render;
pub mod service;
pub mod store;

pub use error::PlanError;
pub use generator::{GenerationRequest, GeneratorOutput, PlanGenerator};
pub use service::{DayRegeneration, GenerationOutcome, PlanService};
