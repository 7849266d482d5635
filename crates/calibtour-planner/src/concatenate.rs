//! Trajectory concatenation.
//!
//! Two registry chores: erasing the artifacts each `solve()` leaves behind,
//! and merging the stored segments down to a single path.

use calibtour_core::{PathId, PathRegistry, PathSegment, PlannerError, Result, Trajectory};
use tracing::{debug, info};

use crate::session::PlanningSession;

/// Keeps the planner's path registry bounded and merges it at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryConcatenator {
    artifacts_per_solve: usize,
}

impl TrajectoryConcatenator {
    /// `artifacts_per_solve` extra entries are expected after every solve.
    pub fn new(artifacts_per_solve: usize) -> Self {
        Self {
            artifacts_per_solve,
        }
    }

    pub fn artifacts_per_solve(&self) -> usize {
        self.artifacts_per_solve
    }

    /// Erases the intermediate entries of the last solve, keeping its final
    /// (fully optimized) path.
    ///
    /// `produced` is the number of entries the solve stored; it must be
    /// exactly `artifacts_per_solve + 1`, otherwise nothing is erased.
    ///
    /// # Errors
    ///
    /// `Planner` on a count mismatch or a failed registry call.
    pub fn discard_artifacts<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        produced: usize,
    ) -> Result<usize>
    where
        P: PathRegistry + ?Sized,
    {
        let expected = self.artifacts_per_solve + 1;
        if produced != expected {
            return Err(PlannerError::new(
                "solve",
                format!("stored {produced} paths, expected {expected}"),
            )
            .into());
        }
        for _ in 0..self.artifacts_per_solve {
            let n = session.planner_mut().number_paths()?;
            // The entry just before the last: an earlier optimization stage.
            let Some(index) = n.checked_sub(2) else {
                return Err(PlannerError::new(
                    "erasePath",
                    format!("registry holds {n} paths, nothing to prune"),
                )
                .into());
            };
            let id = PathId(index);
            session.planner_mut().erase_path(id)?;
            session.statistics_mut().paths_erased += 1;
            debug!(event = "path_erased", path = %id, remaining = n - 1);
        }
        Ok(self.artifacts_per_solve)
    }

    /// Merges the two lowest-indexed stored paths until one remains.
    ///
    /// Returns the surviving entry, or `None` if the registry is empty.
    pub fn merge_down<P>(&self, session: &mut PlanningSession<'_, P>) -> Result<Option<PathId>>
    where
        P: PathRegistry + ?Sized,
    {
        loop {
            let n = session.planner_mut().number_paths()?;
            match n {
                0 => return Ok(None),
                1 => return Ok(Some(PathId(0))),
                _ => {
                    session
                        .planner_mut()
                        .concatenate_path(PathId(0), PathId(1))?;
                    session.planner_mut().erase_path(PathId(1))?;
                    session.statistics_mut().merges += 1;
                    debug!(event = "paths_merged", remaining = n - 1);
                }
            }
        }
    }

    /// Collects planned segments into a trajectory and merges the registry.
    pub fn concatenate<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        segments: Vec<PathSegment>,
    ) -> Result<Trajectory>
    where
        P: PathRegistry + ?Sized,
    {
        let mut trajectory = Trajectory::new();
        for segment in segments {
            trajectory.push_segment(segment);
        }
        if let Some(path) = self.merge_down(session)? {
            trajectory.set_path(path);
        }
        info!(
            event = "trajectory_merged",
            segments = trajectory.segment_count(),
            pieces = trajectory.kept_piece_count(),
            discarded = trajectory.discarded_count(),
            merges = session.statistics().merges,
        );
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibtour_core::{CalibrationError, Configuration, ProblemSolver, Roadmap};
    use calibtour_test::FakePlanner;

    fn q(x: f64) -> Configuration {
        Configuration::new(vec![x])
    }

    fn solve(planner: &mut FakePlanner, from: f64, to: f64) {
        planner.reset_goal_configs().unwrap();
        planner.set_initial_config(&q(from)).unwrap();
        planner.add_goal_config(&q(to)).unwrap();
        planner.solve().unwrap();
    }

    #[test]
    fn test_discard_keeps_last_optimized_path() {
        let mut planner = FakePlanner::new().with_optimizers(&["A", "B"]);
        solve(&mut planner, 0.0, 1.0);
        solve(&mut planner, 1.0, 2.0);
        let mut session = PlanningSession::new(&mut planner);

        let concatenator = TrajectoryConcatenator::new(2);
        assert_eq!(concatenator.discard_artifacts(&mut session, 3).unwrap(), 2);
        assert_eq!(session.statistics().paths_erased, 2);

        // First solve untouched, second reduced to its final path.
        let registry = planner.registry();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry[3].legs[0].optimized_by, vec!["A", "B"]);
        assert_eq!(registry[3].start(), Some(&q(1.0)));
        assert_eq!(registry[2].legs[0].optimized_by, vec!["A", "B"]);
        assert_eq!(registry[2].start(), Some(&q(0.0)));
    }

    #[test]
    fn test_discard_rejects_unexpected_count() {
        let mut planner = FakePlanner::new().with_optimizers(&["A"]);
        solve(&mut planner, 0.0, 1.0);
        let mut session = PlanningSession::new(&mut planner);

        let err = TrajectoryConcatenator::new(2)
            .discard_artifacts(&mut session, 2)
            .unwrap_err();

        assert!(matches!(err, CalibrationError::Planner(_)));
        assert_eq!(planner.registry().len(), 2);
    }

    #[test]
    fn test_merge_down_to_one() {
        let mut planner = FakePlanner::new();
        for x in 0..4 {
            let x = f64::from(x);
            planner.direct_path(&q(x), &q(x + 1.0), false).unwrap();
        }
        let mut session = PlanningSession::new(&mut planner);

        let path = TrajectoryConcatenator::new(0)
            .merge_down(&mut session)
            .unwrap();

        assert_eq!(path, Some(PathId(0)));
        assert_eq!(session.statistics().merges, 3);
        let registry = planner.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry[0].legs.len(), 4);
        assert!(registry[0].is_continuous());
        assert_eq!(registry[0].end(), Some(&q(4.0)));
    }

    #[test]
    fn test_merge_down_empty_registry() {
        let mut planner = FakePlanner::new();
        let mut session = PlanningSession::new(&mut planner);
        let trajectory = TrajectoryConcatenator::new(2)
            .concatenate(&mut session, Vec::new())
            .unwrap();
        assert_eq!(trajectory.path(), None);
        assert_eq!(trajectory.segment_count(), 0);
    }
}
