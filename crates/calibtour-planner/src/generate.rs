//! Random target generation.

use calibtour_config::{CalibrationConfig, TransitionConfig};
use calibtour_core::{CalibrationError, Configuration, ConfigurationSpace, Projection, Result};
use tracing::{info, trace};

use crate::session::PlanningSession;

/// Samples configurations on a transition's leaf until enough survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGenerator {
    max_attempts: usize,
    free_loop: String,
}

impl TargetGenerator {
    /// Generator on the default free-motion loop transition.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            free_loop: TransitionConfig::default().free_loop,
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            max_attempts: config.generation.max_attempts,
            free_loop: config.transitions.free_loop.clone(),
        }
    }

    /// Transition used by [`shoot_on_free_loop`](Self::shoot_on_free_loop).
    pub fn free_loop(&self) -> &str {
        &self.free_loop
    }

    /// [`shoot`](Self::shoot) on the free-motion loop transition.
    pub fn shoot_on_free_loop<S, F>(
        &self,
        session: &mut PlanningSession<'_, S>,
        q_seed: &Configuration,
        n: usize,
        accept: F,
    ) -> Result<Vec<Configuration>>
    where
        S: ConfigurationSpace + ?Sized,
        F: FnMut(&Configuration) -> bool,
    {
        self.shoot(session, &self.free_loop, q_seed, n, accept)
    }

    /// Collects `n` configurations.
    ///
    /// Each attempt shoots a random configuration, projects it onto
    /// `transition` from `q_seed`, then keeps it only if `accept` agrees and
    /// the planner reports it valid.
    ///
    /// # Errors
    ///
    /// `GenerationExhausted` once `max_attempts` shots did not yield `n`
    /// survivors; `Planner` if a planner call fails.
    pub fn shoot<S, F>(
        &self,
        session: &mut PlanningSession<'_, S>,
        transition: &str,
        q_seed: &Configuration,
        n: usize,
        mut accept: F,
    ) -> Result<Vec<Configuration>>
    where
        S: ConfigurationSpace + ?Sized,
        F: FnMut(&Configuration) -> bool,
    {
        let space = session.planner_mut();
        let mut configs = Vec::with_capacity(n);
        let mut attempts = 0;
        while configs.len() < n {
            if attempts == self.max_attempts {
                return Err(CalibrationError::GenerationExhausted {
                    transition: transition.to_string(),
                    attempts,
                });
            }
            attempts += 1;

            let q = space.shoot_random_config()?;
            let q = match space.generate_target_config(transition, q_seed, &q)? {
                Projection::Projected(q) => q,
                Projection::Failed(reason) => {
                    trace!(event = "shot_rejected", attempt = attempts, reason = %reason);
                    continue;
                }
            };
            if !accept(&q) {
                trace!(event = "shot_rejected", attempt = attempts, reason = "filter");
                continue;
            }
            if !space.is_config_valid(&q)?.is_valid() {
                trace!(event = "shot_rejected", attempt = attempts, reason = "invalid");
                continue;
            }
            configs.push(q);
        }

        info!(
            event = "targets_generated",
            transition = transition,
            count = configs.len(),
            attempts = attempts,
        );
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibtour_test::FakePlanner;

    fn q(x: f64) -> Configuration {
        Configuration::new(vec![x])
    }

    #[test]
    fn test_collects_survivors() {
        let mut planner = FakePlanner::new()
            .with_random_configs(vec![q(1.0), q(2.0), q(3.0), q(4.0)])
            .with_unprojectable(q(2.0))
            .with_invalid(q(3.0));
        let mut session = PlanningSession::new(&mut planner);

        let configs = TargetGenerator::new(10)
            .shoot(&mut session, "Loop | f", &q(0.0), 2, |_| true)
            .unwrap();

        assert_eq!(configs, vec![q(1.0), q(4.0)]);
        assert_eq!(planner.call_count("shootRandomConfig"), 4);
    }

    #[test]
    fn test_filter_applies_before_validity() {
        let mut planner = FakePlanner::new().with_random_configs(vec![q(-1.0), q(5.0)]);
        let mut session = PlanningSession::new(&mut planner);

        let configs = TargetGenerator::new(10)
            .shoot(&mut session, "Loop | f", &q(0.0), 1, |c| c.as_slice()[0] > 0.0)
            .unwrap();

        assert_eq!(configs, vec![q(5.0)]);
        assert_eq!(planner.call_count("isConfigValid"), 1);
    }

    #[test]
    fn test_exhausted() {
        let mut planner = FakePlanner::new()
            .with_random_configs(vec![q(1.0)])
            .with_failing_transition("Loop | f");
        let mut session = PlanningSession::new(&mut planner);

        let err = TargetGenerator::new(25)
            .shoot(&mut session, "Loop | f", &q(0.0), 1, |_| true)
            .unwrap_err();

        assert!(matches!(
            err,
            CalibrationError::GenerationExhausted { attempts: 25, .. }
        ));
        assert_eq!(planner.call_count("shootRandomConfig"), 25);
    }

    #[test]
    fn test_free_loop_from_config() {
        let mut config = CalibrationConfig::default();
        config.transitions.free_loop = "Loop | 0-0".to_string();
        config.generation.max_attempts = 3;
        let generator = TargetGenerator::from_config(&config);
        assert_eq!(generator.free_loop(), "Loop | 0-0");

        let mut planner = FakePlanner::new()
            .with_random_configs(vec![q(1.0)])
            .with_failing_transition("Loop | 0-0");
        let mut session = PlanningSession::new(&mut planner);

        let err = generator
            .shoot_on_free_loop(&mut session, &q(0.0), 1, |_| true)
            .unwrap_err();

        match err {
            CalibrationError::GenerationExhausted {
                transition,
                attempts,
            } => {
                assert_eq!(transition, "Loop | 0-0");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_default_free_loop() {
        let mut planner = FakePlanner::new().with_random_configs(vec![q(2.0)]);
        let mut session = PlanningSession::new(&mut planner);

        let generator = TargetGenerator::new(5);
        assert_eq!(generator.free_loop(), "Loop | f");
        let configs = generator
            .shoot_on_free_loop(&mut session, &q(0.0), 1, |_| true)
            .unwrap();
        assert_eq!(configs, vec![q(2.0)]);
    }

    #[test]
    fn test_zero_requested() {
        let mut planner = FakePlanner::new();
        let mut session = PlanningSession::new(&mut planner);
        let configs = TargetGenerator::new(1)
            .shoot(&mut session, "Loop | f", &q(0.0), 0, |_| true)
            .unwrap();
        assert!(configs.is_empty());
        assert_eq!(planner.call_count("shootRandomConfig"), 0);
    }
}
