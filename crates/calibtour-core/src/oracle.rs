//! Distance oracle seam.

use crate::configuration::Configuration;
use crate::error::Result;

/// Returns the cost of connecting two configurations.
///
/// Implementations may be remote round trips; callers must not assume the
/// call is cheap. `&mut self` lets adapters hold a planner session.
pub trait DistanceOracle {
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64>;
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for &mut O {
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64> {
        (**self).distance(a, b)
    }
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for Box<O> {
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64> {
        (**self).distance(a, b)
    }
}
