//! Calibtour - Calibration tour planning
//!
//! Orders calibration targets into a short visiting tour and drives an
//! external motion planner through it, one segment at a time, merging the
//! result into a single trajectory.
//!
//! # Example
//!
//! ```rust
//! use calibtour::prelude::*;
//!
//! let set: ConfigurationSet = [0.0, 3.0, 1.0, 2.0]
//!     .into_iter()
//!     .map(|x| Configuration::new(vec![x]))
//!     .collect();
//!
//! let mut solver = TourSolver::new(EuclideanDistance, TourBuilder::new(0));
//! let solution = solver.solve(&set).unwrap();
//! assert_eq!(solution.tour.as_slice(), &[0, 2, 3, 1]);
//! ```

// Data model
pub use calibtour_core::{
    CalibrationTarget, Configuration, ConfigurationSet, DistanceMatrix, HandleId, PathId,
    PathSegment, PieceRef, SegmentKind, TargetSet, Tour, Trajectory,
};

// Errors
pub use calibtour_core::{CalibrationError, DataError, PlannerError, Result};

// External planner seams
pub use calibtour_core::{
    ConfigurationSpace, DirectPath, DistanceOracle, ParameterValue, PathRegistry, Planner,
    PlannerResult, ProblemSolver, Projection, Roadmap, SegmentPlanner, SegmentRequest, Validity,
};

// Configuration
pub use calibtour_config::{CalibrationConfig, ConfigError, TourConfig};

// Tour construction
pub use calibtour_solver::{
    DistanceMatrixBuilder, EuclideanDistance, NearestNeighborConstructor, TourBuilder,
    TourSolution, TourSolver, TourStatistics, TwoOptImprover,
};

// Planner drivers
pub use calibtour_planner::{
    CalibrationPlanner, CalibrationReport, PlannerDistance, PlanningSession, PlanningStatistics,
    RoadmapBuilder, RoadmapSummary, SegmentPathRequester, TargetGenerator, TourPlan, TourPlanner,
    TrajectoryConcatenator,
};

/// Persisted target file codec.
pub use calibtour_core::data;

#[cfg(feature = "console")]
pub use calibtour_console as console;

pub mod prelude {
    pub use super::{
        CalibrationConfig, CalibrationError, CalibrationPlanner, CalibrationTarget, Configuration,
        ConfigurationSet, DistanceOracle, EuclideanDistance, HandleId, Planner, PlanningSession,
        TargetSet, Tour, TourBuilder, TourPlanner, TourSolver, Trajectory,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use calibtour_test::{target_set, FakePlanner};

    #[test]
    fn test_calibration_through_facade() {
        let mut planner = FakePlanner::new();
        let config = CalibrationConfig::default();
        let session = PlanningSession::new(&mut planner);

        let report = CalibrationPlanner::new(config)
            .plan(session, &Configuration::new(vec![-1.0, 0.0]), &target_set(3))
            .unwrap();

        assert_eq!(report.targets.len(), 3);
        // Approach, one contact and one transfer per target (last returns home).
        assert_eq!(report.trajectory.segment_count(), 7);
        assert!(report.trajectory.path().is_some());
    }
}
