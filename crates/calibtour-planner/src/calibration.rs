//! Calibration run: sweep the manipulated object through every target.

use calibtour_config::CalibrationConfig;
use calibtour_core::{
    CalibrationError, Configuration, ConfigurationSpace, PathRegistry, ProblemSolver, Projection,
    Result, SegmentPlanner, SegmentRequest, TargetSet, Tour, Trajectory,
};
use calibtour_solver::{TourBuilder, TourSolver, TourStatistics};
use tracing::info;

use crate::oracle::PlannerDistance;
use crate::segment::SegmentPathRequester;
use crate::session::{PlanningSession, PlanningStatistics};

/// Everything a calibration run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    /// Initial configuration after projection onto the starting transition.
    pub initial: Configuration,
    /// Targets in visiting order.
    pub targets: TargetSet,
    /// Visiting order over the input targets.
    pub tour: Tour,
    pub tour_cost: f64,
    pub trajectory: Trajectory,
    pub tour_statistics: TourStatistics,
    pub planning_statistics: PlanningStatistics,
}

/// Plans the full calibration motion.
///
/// From the projected initial configuration: free motion to the first
/// pre-grasp, then for every target a contact segment on its handle
/// followed by free motion to the next pre-grasp (or back to the initial
/// configuration after the last one). The registry is merged into one path.
#[derive(Debug, Clone)]
pub struct CalibrationPlanner {
    config: CalibrationConfig,
    tour_builder: TourBuilder,
    requester: SegmentPathRequester,
}

impl CalibrationPlanner {
    pub fn new(config: CalibrationConfig) -> Self {
        let tour_builder = TourBuilder::from_config(&config);
        let requester = SegmentPathRequester::from_config(&config);
        Self {
            config,
            tour_builder,
            requester,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Projects `q_init` onto the starting transition.
    ///
    /// # Errors
    ///
    /// `ProjectionFailed` if the planner cannot project it.
    pub fn project_initial<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        q_init: &Configuration,
    ) -> Result<Configuration>
    where
        P: ConfigurationSpace + ?Sized,
    {
        let transition = &self.config.transitions.starting_motion;
        let projection = session
            .planner_mut()
            .generate_target_config(transition, q_init, q_init)
            .map_err(|e| CalibrationError::ProjectionFailed {
                transition: transition.clone(),
                reason: e.to_string(),
            })?;
        match projection {
            Projection::Projected(q) => Ok(q),
            Projection::Failed(reason) => Err(CalibrationError::ProjectionFailed {
                transition: transition.clone(),
                reason,
            }),
        }
    }

    /// Runs the whole calibration plan. Consumes the session.
    ///
    /// # Errors
    ///
    /// The first failure aborts the run: `ProjectionFailed`,
    /// `DistanceUnavailable`, `NoPathFound`, or `Planner`.
    pub fn plan<P>(
        &self,
        mut session: PlanningSession<'_, P>,
        q_init: &Configuration,
        targets: &TargetSet,
    ) -> Result<CalibrationReport>
    where
        P: ProblemSolver + ConfigurationSpace + SegmentPlanner + PathRegistry + ?Sized,
    {
        info!(
            event = "calibration_start",
            targets = targets.len(),
            strategy = self.tour_builder.strategy(),
        );

        let initial = self.project_initial(&mut session, q_init)?;
        session.configure_problem(&self.config)?;

        let solution = {
            let oracle = PlannerDistance::new(session.planner_mut());
            TourSolver::new(oracle, self.tour_builder).solve(&targets.pregrasp_set())?
        };
        let ordered = targets.reordered(&solution.tour)?;

        let mut segments = Vec::new();
        if let Some(first) = ordered.get(0) {
            let request =
                SegmentRequest::free_motion(0, initial.clone(), first.pregrasp.clone());
            segments.push(self.requester.plan_free_motion(&mut session, &request)?);
        }
        for (k, target) in ordered.iter().enumerate() {
            let request = SegmentRequest::contact(
                segments.len(),
                target.pregrasp.clone(),
                target.contact.clone(),
                target.handle.clone(),
            );
            segments.push(self.requester.plan_contact(&mut session, &request)?);

            let next = match ordered.get(k + 1) {
                Some(next) => Some(&next.pregrasp),
                None if self.config.return_to_start => Some(&initial),
                None => None,
            };
            if let Some(to) = next {
                let request = SegmentRequest::free_motion(
                    segments.len(),
                    target.pregrasp.clone(),
                    to.clone(),
                );
                segments.push(self.requester.plan_free_motion(&mut session, &request)?);
            }
        }

        let trajectory = self
            .requester
            .concatenator()
            .concatenate(&mut session, segments)?;
        let planning_statistics = session.finish();

        info!(
            event = "calibration_end",
            segments = trajectory.segment_count(),
            tour_cost = solution.statistics.tour_cost,
            solves = planning_statistics.solves,
            skipped_optimizations = planning_statistics.optimizations_skipped,
            duration_ms = planning_statistics.duration.as_millis() as u64,
        );

        Ok(CalibrationReport {
            initial,
            targets: ordered,
            tour_cost: solution.statistics.tour_cost,
            tour: solution.tour,
            trajectory,
            tour_statistics: solution.statistics,
            planning_statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibtour_core::{HandleId, SegmentKind};
    use calibtour_test::{target_set, FakePlanner};

    fn q_init() -> Configuration {
        Configuration::new(vec![-1.0, 0.0])
    }

    fn planner() -> FakePlanner {
        FakePlanner::new()
    }

    #[test]
    fn test_full_run_segment_sequence() {
        let mut planner = planner();
        let calibration = CalibrationPlanner::new(CalibrationConfig::default());

        let report = calibration
            .plan(PlanningSession::new(&mut planner), &q_init(), &target_set(3))
            .unwrap();

        // free, (contact, free) x 3
        let kinds: Vec<_> = report
            .trajectory
            .segments()
            .iter()
            .map(|s| matches!(s.kind, SegmentKind::Contact { .. }))
            .collect();
        assert_eq!(kinds, vec![false, true, false, true, false, true, false]);
        let indices: Vec<_> = report.trajectory.segments().iter().map(|s| s.index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());

        assert_eq!(report.tour.as_slice(), &[0, 1, 2]);
        assert_eq!(report.tour_cost, 2.0);
        assert_eq!(report.planning_statistics.solves, 4);

        let registry = planner.registry();
        assert_eq!(registry.len(), 1);
        assert!(registry[0].is_continuous());
        assert_eq!(registry[0].start(), Some(&q_init()));
        assert_eq!(registry[0].end(), Some(&q_init()));
        assert_eq!(registry[0].legs.len(), report.trajectory.kept_piece_count());
        assert_eq!(planner.live_pieces(), 0);
    }

    #[test]
    fn test_targets_reordered_with_their_contacts() {
        let targets = TargetSet::from_parts(
            vec![
                Configuration::new(vec![0.0, 0.0]),
                Configuration::new(vec![3.0, 0.0]),
                Configuration::new(vec![1.0, 0.0]),
            ],
            vec![
                Configuration::new(vec![0.0, 1.0]),
                Configuration::new(vec![3.0, 1.0]),
                Configuration::new(vec![1.0, 1.0]),
            ],
            vec!["h0".into(), "h3".into(), "h1".into()],
        )
        .unwrap();
        let mut planner = planner();
        let calibration = CalibrationPlanner::new(CalibrationConfig::default());

        let report = calibration
            .plan(PlanningSession::new(&mut planner), &q_init(), &targets)
            .unwrap();

        assert_eq!(report.tour.as_slice(), &[0, 2, 1]);
        let handles: Vec<_> = report.targets.handles().map(HandleId::as_str).collect();
        assert_eq!(handles, vec!["h0", "h1", "h3"]);
        for target in &report.targets {
            assert_eq!(target.pregrasp.as_slice()[0], target.contact.as_slice()[0]);
        }
    }

    #[test]
    fn test_without_return_to_start() {
        let mut planner = planner();
        let config = CalibrationConfig::default().with_return_to_start(false);

        let report = CalibrationPlanner::new(config)
            .plan(PlanningSession::new(&mut planner), &q_init(), &target_set(2))
            .unwrap();

        assert_eq!(report.trajectory.segment_count(), 4);
        assert_eq!(
            planner.registry()[0].end(),
            Some(&Configuration::new(vec![1.0, 0.0]))
        );
    }

    #[test]
    fn test_projection_failure_aborts_before_planning() {
        let mut planner = planner().with_failing_transition("starting_motion");

        let err = CalibrationPlanner::new(CalibrationConfig::default())
            .plan(PlanningSession::new(&mut planner), &q_init(), &target_set(2))
            .unwrap_err();

        match err {
            CalibrationError::ProjectionFailed { transition, .. } => {
                assert_eq!(transition, "starting_motion");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(planner.call_count("getDistance"), 0);
        assert_eq!(planner.call_count("solve"), 0);
    }

    #[test]
    fn test_distance_failure_names_pair() {
        let mut planner = planner().failing_on("getDistance", 2);

        let err = CalibrationPlanner::new(CalibrationConfig::default())
            .plan(PlanningSession::new(&mut planner), &q_init(), &target_set(3))
            .unwrap_err();

        assert!(matches!(
            err,
            CalibrationError::DistanceUnavailable { from: 0, to: 2, .. }
        ));
        assert_eq!(planner.call_count("solve"), 0);
    }

    #[test]
    fn test_contact_failure_aborts_run() {
        let unreachable = Configuration::new(vec![1.0, 1.0]);
        let mut planner = planner().with_unreachable(unreachable);

        let err = CalibrationPlanner::new(CalibrationConfig::default())
            .plan(PlanningSession::new(&mut planner), &q_init(), &target_set(3))
            .unwrap_err();

        match err {
            CalibrationError::NoPathFound {
                segment,
                description,
                ..
            } => {
                assert_eq!(segment, 3);
                assert_eq!(description, "contact on box/handle_1");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(planner.call_count("concatenatePath"), 0);
    }

    #[test]
    fn test_empty_targets() {
        let mut planner = planner();
        let report = CalibrationPlanner::new(CalibrationConfig::default())
            .plan(PlanningSession::new(&mut planner), &q_init(), &TargetSet::default())
            .unwrap();
        assert!(report.tour.is_empty());
        assert_eq!(report.trajectory.segment_count(), 0);
        assert_eq!(report.trajectory.path(), None);
    }
}
