//! Query functions, one module per table.

pub mod plan_versions;
