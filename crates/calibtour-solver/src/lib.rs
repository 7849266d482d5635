//! Calibtour Solver - Tour construction over expensive distance oracles
//!
//! This crate provides:
//! - The distance oracle seam and a local Euclidean oracle
//! - Distance matrix construction with one oracle call per pair
//! - Nearest-neighbor tour construction with an optional 2-opt pass
//! - A tour solver wiring the above together, with run statistics

pub mod matrix;
pub mod oracle;
pub mod solver;
pub mod statistics;
pub mod tour;

pub use matrix::DistanceMatrixBuilder;
pub use oracle::{DistanceOracle, EuclideanDistance};
pub use solver::{TourSolution, TourSolver};
pub use statistics::TourStatistics;
pub use tour::{NearestNeighborConstructor, TourBuilder, TwoOptImprover};

pub use calibtour_core::{CalibrationError, Result};
