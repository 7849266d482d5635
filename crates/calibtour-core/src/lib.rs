//! Calibtour Core - Data model for calibration tour planning
//!
//! This crate provides the types every other calibtour crate passes around:
//! - Configurations, configuration sets and calibration targets
//! - The pairwise distance matrix and visiting tours
//! - References to planner-owned paths and the merged trajectory
//! - The distance oracle and external planner capability interfaces
//! - The error taxonomy and persisted-file codec

pub mod configuration;
pub mod data;
pub mod error;
pub mod matrix;
pub mod oracle;
pub mod path;
pub mod planner;
pub mod tour;

pub use configuration::{CalibrationTarget, Configuration, ConfigurationSet, HandleId, TargetSet};
pub use data::DataError;
pub use error::{CalibrationError, PlannerError, Result};
pub use matrix::DistanceMatrix;
pub use oracle::DistanceOracle;
pub use path::{PathId, PathSegment, PieceRef, SegmentKind, Trajectory};
pub use planner::{
    ConfigurationSpace, DirectPath, ParameterValue, PathRegistry, Planner, PlannerResult,
    ProblemSolver, Projection, Roadmap, SegmentPlanner, SegmentRequest, Validity,
};
pub use tour::Tour;
