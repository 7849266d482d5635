//! Error types for calibration tour planning

use thiserror::Error;

use crate::data::DataError;

/// Failure payload of a single external planner call.
///
/// The external solver reports errors in its own terms; this keeps the
/// operation that failed next to the message it returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct PlannerError {
    /// Name of the planner operation (e.g. `solve`, `erasePath`).
    pub operation: &'static str,
    /// Message returned by the planner.
    pub message: String,
}

impl PlannerError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Main error type for calibration tour planning.
///
/// Every variant aborts the whole run; no layer retries.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// A configuration does not have the expected number of coordinates.
    #[error("Dimension mismatch: configuration {index} has {actual} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// The distance oracle failed for one pair.
    #[error("Distance unavailable between configurations {from} and {to}: {reason}")]
    DistanceUnavailable {
        from: usize,
        to: usize,
        reason: String,
    },

    /// The planner could not connect two configurations.
    #[error("No path found for segment {segment} ({description}): {reason}")]
    NoPathFound {
        segment: usize,
        description: String,
        reason: String,
    },

    /// A seed configuration could not be projected onto a required state.
    #[error("Projection failed on transition '{transition}': {reason}")]
    ProjectionFailed { transition: String, reason: String },

    /// Random target generation gave up.
    #[error("Configuration generation on transition '{transition}' exhausted after {attempts} attempts")]
    GenerationExhausted { transition: String, attempts: usize },

    /// Any other external planner call failed.
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// Persisted configuration files could not be read or written.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Caller-side contract violation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for calibration operations
pub type Result<T> = std::result::Result<T, CalibrationError>;
