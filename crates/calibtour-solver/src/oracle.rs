//! Distance oracles usable without a planner.

use calibtour_core::{CalibrationError, Configuration, Result};

pub use calibtour_core::DistanceOracle;

/// In-process oracle: Euclidean norm of the coordinate difference.
///
/// Lets tours be ordered offline, without a planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceOracle for EuclideanDistance {
    /// # Errors
    ///
    /// `DimensionMismatch` with `index = 1` (the second argument) when the
    /// coordinate counts differ.
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64> {
        if a.dim() != b.dim() {
            return Err(CalibrationError::DimensionMismatch {
                index: 1,
                expected: a.dim(),
                actual: b.dim(),
            });
        }
        let sum: f64 = a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        Ok(sum.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance() {
        let a = Configuration::new(vec![0.0, 0.0]);
        let b = Configuration::new(vec![3.0, 4.0]);
        assert_eq!(EuclideanDistance.distance(&a, &b).unwrap(), 5.0);
        assert_eq!(EuclideanDistance.distance(&b, &a).unwrap(), 5.0);
        assert_eq!(EuclideanDistance.distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_dimension_mismatch() {
        let a = Configuration::new(vec![0.0, 0.0]);
        let b = Configuration::new(vec![1.0]);
        let err = EuclideanDistance.distance(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_oracle_through_mut_ref() {
        fn total<O: DistanceOracle>(mut oracle: O, qs: &[Configuration]) -> f64 {
            oracle.distance(&qs[0], &qs[1]).unwrap()
        }
        let mut oracle = EuclideanDistance;
        let qs = [Configuration::new(vec![1.0]), Configuration::new(vec![-1.0])];
        assert_eq!(total(&mut oracle, &qs), 2.0);
    }
}
