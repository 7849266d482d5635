//! Free-motion tour through a configuration set.

use calibtour_config::CalibrationConfig;
use calibtour_core::{ConfigurationSet, ProblemSolver, Result, SegmentRequest, Tour, Trajectory};
use calibtour_solver::{TourBuilder, TourSolver, TourStatistics};
use tracing::info;

use crate::oracle::PlannerDistance;
use crate::segment::SegmentPathRequester;
use crate::session::PlanningSession;

/// Result of [`TourPlanner::plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct TourPlan {
    pub tour: Tour,
    pub tour_statistics: TourStatistics,
    pub trajectory: Trajectory,
}

/// Orders a configuration set and plans free motion along the order.
#[derive(Debug, Clone)]
pub struct TourPlanner {
    config: CalibrationConfig,
    tour_builder: TourBuilder,
    requester: SegmentPathRequester,
}

impl TourPlanner {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            config: config.clone(),
            tour_builder: TourBuilder::from_config(config),
            requester: SegmentPathRequester::from_config(config),
        }
    }

    /// Selects the configured optimizers on the planner's current problem,
    /// builds the distance matrix through the planner, orders the set and
    /// requests one free-motion segment per consecutive pair, pruning
    /// artifacts after each, then merges the registry down to one path.
    ///
    /// `n` configurations give `n - 1` segments; fewer than two give none.
    ///
    /// # Errors
    ///
    /// The first failure aborts the run; no partial trajectory is returned.
    pub fn plan<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        set: &ConfigurationSet,
    ) -> Result<TourPlan>
    where
        P: ProblemSolver + ?Sized,
    {
        info!(event = "tour_plan_start", configuration_count = set.len());
        session.configure_problem(&self.config)?;

        let solution = {
            let oracle = PlannerDistance::new(session.planner_mut());
            TourSolver::new(oracle, self.tour_builder).solve(set)?
        };
        let ordered = set.ordered(&solution.tour)?;

        let mut segments = Vec::with_capacity(ordered.len().saturating_sub(1));
        for (index, pair) in ordered.configurations().windows(2).enumerate() {
            let request = SegmentRequest::free_motion(index, pair[0].clone(), pair[1].clone());
            segments.push(self.requester.plan_free_motion(session, &request)?);
        }
        let trajectory = self.requester.concatenator().concatenate(session, segments)?;

        info!(
            event = "tour_plan_end",
            segments = trajectory.segment_count(),
            tour_cost = solution.statistics.tour_cost,
            duration_ms = session.elapsed().as_millis() as u64,
        );
        Ok(TourPlan {
            tour: solution.tour,
            tour_statistics: solution.statistics,
            trajectory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibtour_core::{CalibrationError, Configuration, PathId};
    use calibtour_test::{cycle_matrix, indexed_configurations, FakePlanner};

    fn planner_for_cycle() -> FakePlanner {
        FakePlanner::new()
            .with_optimizers(&["EnforceTransitionSemantic", "SimpleTimeParameterization"])
            .with_distance_table(cycle_matrix())
    }

    #[test]
    fn test_end_to_end_four_configurations() {
        let mut planner = planner_for_cycle();
        let config = CalibrationConfig::default();
        let mut session = PlanningSession::new(&mut planner);

        let plan = TourPlanner::from_config(&config)
            .plan(&mut session, &indexed_configurations(4))
            .unwrap();

        assert_eq!(plan.tour.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(plan.trajectory.segment_count(), 3);
        assert_eq!(plan.trajectory.path(), Some(PathId(0)));
        assert_eq!(plan.tour_statistics.oracle_calls, 6);
        assert_eq!(session.statistics().solves, 3);

        let registry = planner.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry[0].legs.len(), plan.trajectory.kept_piece_count());
        assert!(registry[0].is_continuous());
        assert_eq!(registry[0].start(), Some(&Configuration::new(vec![0.0])));
        assert_eq!(registry[0].end(), Some(&Configuration::new(vec![3.0])));
    }

    #[test]
    fn test_configures_unprepared_planner() {
        let mut planner = FakePlanner::new().with_distance_table(cycle_matrix());
        let mut session = PlanningSession::new(&mut planner);

        let plan = TourPlanner::from_config(&CalibrationConfig::default())
            .plan(&mut session, &indexed_configurations(4))
            .unwrap();

        assert_eq!(plan.trajectory.segment_count(), 3);
        assert_eq!(
            planner.optimizers(),
            &["EnforceTransitionSemantic", "SimpleTimeParameterization"]
        );
        assert_eq!(planner.registry().len(), 1);
    }

    #[test]
    fn test_piece_accounting() {
        let mut planner = planner_for_cycle();
        let mut session = PlanningSession::new(&mut planner);

        let plan = TourPlanner::from_config(&CalibrationConfig::default())
            .plan(&mut session, &indexed_configurations(4))
            .unwrap();

        let trajectory = &plan.trajectory;
        assert_eq!(trajectory.piece_count(), 9);
        assert_eq!(trajectory.discarded_count(), 6);
        assert_eq!(trajectory.kept_piece_count(), 3);
        assert_eq!(session.statistics().paths_erased, 6);
        assert_eq!(session.statistics().merges, 2);
    }

    #[test]
    fn test_single_configuration_has_no_segments() {
        let mut planner = planner_for_cycle();
        let mut session = PlanningSession::new(&mut planner);

        let plan = TourPlanner::from_config(&CalibrationConfig::default())
            .plan(&mut session, &indexed_configurations(1))
            .unwrap();

        assert_eq!(plan.tour.as_slice(), &[0]);
        assert_eq!(plan.trajectory.segment_count(), 0);
        assert_eq!(plan.trajectory.path(), None);
        assert_eq!(planner.call_count("solve"), 0);
    }

    #[test]
    fn test_failed_segment_aborts_run() {
        let mut planner = planner_for_cycle().failing_on("solve", 2);
        let mut session = PlanningSession::new(&mut planner);

        let err = TourPlanner::from_config(&CalibrationConfig::default())
            .plan(&mut session, &indexed_configurations(4))
            .unwrap_err();

        assert!(matches!(err, CalibrationError::NoPathFound { segment: 1, .. }));
        assert_eq!(planner.call_count("solve"), 2);
        assert_eq!(planner.call_count("concatenatePath"), 0);
    }
}
