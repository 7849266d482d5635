//! Shared test fixtures for calibtour crates.
//!
//! This crate provides fixtures and in-memory fakes for testing.
//! It depends on `calibtour-core` only, so every other crate can take it as a
//! dev-dependency without cycles.
//!
//! - [`fixtures`] - configuration sets, matrices and targets with known answers
//! - [`oracle`] - table-driven distance oracle with call log
//! - [`planner`] - in-memory implementation of every planner capability
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! calibtour-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use calibtour_test::{cycle_matrix, indexed_configurations, FakePlanner};
//! ```

pub mod fixtures;
pub mod oracle;
pub mod planner;

// Re-export commonly used types at crate root for convenience
pub use fixtures::{
    cycle_matrix, indexed_configurations, line_configurations, line_matrix, target_set, tie_matrix,
};
pub use oracle::TableOracle;
pub use planner::{FakePath, FakePlanner, Leg};
