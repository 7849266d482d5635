//! Distance oracle backed by the planner.

use calibtour_core::{Configuration, DistanceOracle, ProblemSolver, Result};

/// Asks the planner's distance function; one round trip per call.
#[derive(Debug)]
pub struct PlannerDistance<'p, P: ?Sized> {
    planner: &'p mut P,
}

impl<'p, P: ProblemSolver + ?Sized> PlannerDistance<'p, P> {
    pub fn new(planner: &'p mut P) -> Self {
        Self { planner }
    }
}

impl<P: ProblemSolver + ?Sized> DistanceOracle for PlannerDistance<'_, P> {
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64> {
        Ok(self.planner.distance(a, b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibtour_core::CalibrationError;
    use calibtour_test::FakePlanner;

    #[test]
    fn test_planner_distance() {
        let mut planner = FakePlanner::new();
        let mut oracle = PlannerDistance::new(&mut planner);
        let a = Configuration::new(vec![0.0, 0.0]);
        let b = Configuration::new(vec![6.0, 8.0]);
        assert_eq!(oracle.distance(&a, &b).unwrap(), 10.0);
        assert_eq!(planner.call_count("getDistance"), 1);
    }

    #[test]
    fn test_planner_error_wrapped() {
        let mut planner = FakePlanner::new().failing_on("getDistance", 1);
        let mut oracle = PlannerDistance::new(&mut planner);
        let q = Configuration::new(vec![0.0]);
        let err = oracle.distance(&q, &q).unwrap_err();
        assert!(matches!(err, CalibrationError::Planner(_)));
    }
}
