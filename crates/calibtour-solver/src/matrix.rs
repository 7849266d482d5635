//! Distance matrix construction.

use std::time::{Duration, Instant};

use calibtour_core::{CalibrationError, ConfigurationSet, DistanceMatrix, DistanceOracle, Result};
use tracing::{debug, info};

/// Builds the pairwise distance matrix of a configuration set.
///
/// The oracle is called exactly once per unordered pair `(i, j)`, `i < j`;
/// the mirrored entry is copied. The first failure aborts construction and
/// no partial matrix is returned.
///
/// # Example
///
/// ```
/// use calibtour_core::{Configuration, ConfigurationSet};
/// use calibtour_solver::{DistanceMatrixBuilder, EuclideanDistance};
///
/// let set: ConfigurationSet = [0.0, 3.0, 1.0]
///     .into_iter()
///     .map(|x| Configuration::new(vec![x]))
///     .collect();
///
/// let mut builder = DistanceMatrixBuilder::new(EuclideanDistance);
/// let matrix = builder.build(&set).unwrap();
/// assert_eq!(matrix.get(1, 2), 2.0);
/// assert_eq!(builder.oracle_calls(), 3);
/// ```
#[derive(Debug)]
pub struct DistanceMatrixBuilder<O> {
    oracle: O,
    oracle_calls: u64,
    last_duration: Duration,
}

impl<O: DistanceOracle> DistanceMatrixBuilder<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            oracle_calls: 0,
            last_duration: Duration::ZERO,
        }
    }

    /// Oracle calls issued across every `build` on this builder.
    pub fn oracle_calls(&self) -> u64 {
        self.oracle_calls
    }

    /// Wall time of the most recent `build`.
    pub fn last_duration(&self) -> Duration {
        self.last_duration
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// # Errors
    ///
    /// - `DimensionMismatch` if the configurations differ in length; checked
    ///   before any oracle call.
    /// - `DistanceUnavailable { from, to }` if the oracle fails for a pair or
    ///   returns a negative or NaN distance.
    pub fn build(&mut self, set: &ConfigurationSet) -> Result<DistanceMatrix> {
        let started = Instant::now();
        set.common_dimension()?;

        let configurations = set.configurations();
        let size = configurations.len();
        let oracle = &mut self.oracle;
        let calls = &mut self.oracle_calls;

        let matrix = DistanceMatrix::from_upper_triangle(size, |i, j| {
            *calls += 1;
            let d = oracle
                .distance(&configurations[i], &configurations[j])
                .map_err(|e| CalibrationError::DistanceUnavailable {
                    from: i,
                    to: j,
                    reason: e.to_string(),
                })?;
            if d.is_nan() || d < 0.0 {
                return Err(CalibrationError::DistanceUnavailable {
                    from: i,
                    to: j,
                    reason: format!("oracle returned invalid distance {d}"),
                });
            }
            debug!(event = "distance", from = i, to = j, distance = d);
            Ok(d)
        })?;

        self.last_duration = started.elapsed();
        info!(
            event = "matrix_built",
            size = size,
            pairs = size * size.saturating_sub(1) / 2,
            duration_ms = self.last_duration.as_millis() as u64,
        );
        Ok(matrix)
    }
}
