//! Planning session.

use std::time::{Duration, Instant};

use calibtour_config::{CalibrationConfig, TimeParameterizationConfig, SIMPLE_TIME_PARAMETERIZATION};
use calibtour_core::{ParameterValue, ProblemSolver, Result, SegmentPlanner};
use tracing::{info, warn};

/// Counters for one planning session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningStatistics {
    /// Segments planned.
    pub segments: usize,
    /// `solve()` calls issued.
    pub solves: u64,
    /// Pieces returned by segment planning.
    pub pieces_planned: u64,
    /// Optimizer outputs adopted.
    pub optimizations_adopted: u64,
    /// Optimizer outputs dropped because they equaled their input.
    pub optimizations_skipped: u64,
    /// Registry entries erased as artifacts.
    pub paths_erased: u64,
    /// Merge steps of the final concatenation.
    pub merges: u64,
    /// Wall time from session start to `finish`.
    pub duration: Duration,
}

/// Explicit handle on the external planner's shared state.
///
/// The planner holds a single current problem and one path registry; the
/// session is the only way components reach it, passed by `&mut`.
pub struct PlanningSession<'a, P: ?Sized> {
    planner: &'a mut P,
    statistics: PlanningStatistics,
    start_time: Instant,
}

impl<'a, P: ?Sized> PlanningSession<'a, P> {
    pub fn new(planner: &'a mut P) -> Self {
        Self {
            planner,
            statistics: PlanningStatistics::default(),
            start_time: Instant::now(),
        }
    }

    pub fn planner(&self) -> &P {
        &*self.planner
    }

    pub fn planner_mut(&mut self) -> &mut P {
        &mut *self.planner
    }

    pub fn statistics(&self) -> &PlanningStatistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut PlanningStatistics {
        &mut self.statistics
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Ends the session and returns its statistics.
    pub fn finish(mut self) -> PlanningStatistics {
        self.statistics.duration = self.start_time.elapsed();
        self.statistics
    }
}

impl<P: ProblemSolver + ?Sized> PlanningSession<'_, P> {
    /// Selects the configured optimizers and time parameterization on the
    /// planner's current problem.
    pub fn configure_problem(&mut self, config: &CalibrationConfig) -> Result<()> {
        let planner = &mut *self.planner;
        planner.clear_path_optimizers()?;
        for name in &config.planner.optimizers {
            planner.add_path_optimizer(name)?;
        }
        for (name, value) in time_parameterization(&config.planner.time_parameterization) {
            planner.set_parameter(&name, value)?;
        }
        planner.set_max_iter_path_planning(config.planner.max_iter_path_planning)?;

        if config.artifacts_per_solve != config.planner.optimizers.len() {
            warn!(
                event = "artifact_count_mismatch",
                artifacts_per_solve = config.artifacts_per_solve,
                optimizers = config.planner.optimizers.len(),
            );
        }
        info!(
            event = "problem_configured",
            optimizers = config.planner.optimizers.len(),
            max_iter_path_planning = config.planner.max_iter_path_planning,
        );
        Ok(())
    }
}

impl<P: SegmentPlanner + ?Sized> PlanningSession<'_, P> {
    /// Sets a time-parameterization profile on the segment planner.
    pub fn apply_segment_profile(&mut self, profile: &TimeParameterizationConfig) -> Result<()> {
        for (name, value) in time_parameterization(profile) {
            self.planner.set_segment_parameter(&name, value)?;
        }
        Ok(())
    }
}

/// The three named parameters of a time-parameterization profile.
pub(crate) fn time_parameterization(
    profile: &TimeParameterizationConfig,
) -> [(String, ParameterValue); 3] {
    let name = |knob: &str| format!("{SIMPLE_TIME_PARAMETERIZATION}/{knob}");
    [
        (name("maxAcceleration"), profile.max_acceleration.into()),
        (name("safety"), profile.safety.into()),
        (name("order"), profile.order.into()),
    ]
}
