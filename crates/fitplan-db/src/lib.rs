//! PostgreSQL persistence for generated plans.
//!
//! Holds connection configuration, pool setup with embedded migrations, the
//! row models, and query functions for the append-only `plan_versions`
//! table.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
