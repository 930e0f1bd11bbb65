//! Meal planning: macro allocation, ingredient selection, shopping lists,
//! and the deterministic fallback planner that combines them.

pub mod allocator;
pub mod planner;
pub mod selector;
pub mod shopping;

pub use allocator::{DEFAULT_VARIANCE, allocate};
pub use planner::{MOCK_PLANNER, MOCK_PLANNER_VERSION, generate_day, generate_meal_plan};
pub use selector::{MAX_INGREDIENTS_PER_MEAL, select};
pub use shopping::{MIXED_AMOUNT, aggregate};
