//! Matrix plus tour in one call.

use std::time::Instant;

use calibtour_core::{ConfigurationSet, DistanceMatrix, DistanceOracle, Result, Tour};
use tracing::info;

use crate::matrix::DistanceMatrixBuilder;
use crate::statistics::TourStatistics;
use crate::tour::TourBuilder;

/// Ordered tour with the matrix it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TourSolution {
    pub matrix: DistanceMatrix,
    pub tour: Tour,
    pub statistics: TourStatistics,
}

/// Computes a visiting order for a configuration set.
///
/// # Example
///
/// ```
/// use calibtour_core::{Configuration, ConfigurationSet};
/// use calibtour_solver::{EuclideanDistance, TourBuilder, TourSolver};
///
/// let set: ConfigurationSet = [0.0, 3.0, 1.0, 2.0]
///     .into_iter()
///     .map(|x| Configuration::new(vec![x]))
///     .collect();
///
/// let mut solver = TourSolver::new(EuclideanDistance, TourBuilder::new(0));
/// let solution = solver.solve(&set).unwrap();
/// assert_eq!(solution.tour.as_slice(), &[0, 2, 3, 1]);
/// assert_eq!(solution.statistics.input_order_cost, 6.0);
/// ```
#[derive(Debug)]
pub struct TourSolver<O> {
    matrix_builder: DistanceMatrixBuilder<O>,
    tour_builder: TourBuilder,
}

impl<O: DistanceOracle> TourSolver<O> {
    pub fn new(oracle: O, tour_builder: TourBuilder) -> Self {
        Self {
            matrix_builder: DistanceMatrixBuilder::new(oracle),
            tour_builder,
        }
    }

    pub fn tour_builder(&self) -> &TourBuilder {
        &self.tour_builder
    }

    pub fn into_oracle(self) -> O {
        self.matrix_builder.into_oracle()
    }

    /// Builds the matrix, then the tour.
    ///
    /// # Errors
    ///
    /// Any matrix or tour construction error; nothing is returned partially.
    pub fn solve(&mut self, set: &ConfigurationSet) -> Result<TourSolution> {
        info!(event = "tour_solve_start", configuration_count = set.len());

        let calls_before = self.matrix_builder.oracle_calls();
        let matrix = self.matrix_builder.build(set)?;
        let matrix_duration = self.matrix_builder.last_duration();

        let started = Instant::now();
        let tour = self.tour_builder.build(&matrix)?;

        let statistics = TourStatistics {
            configuration_count: set.len(),
            oracle_calls: self.matrix_builder.oracle_calls() - calls_before,
            matrix_duration,
            tour_duration: started.elapsed(),
            input_order_cost: Tour::identity(set.len()).cost(&matrix),
            tour_cost: tour.cost(&matrix),
        };

        info!(
            event = "tour_solve_end",
            configuration_count = statistics.configuration_count,
            oracle_calls = statistics.oracle_calls,
            input_order_cost = statistics.input_order_cost,
            tour_cost = statistics.tour_cost,
            duration_ms = statistics.total_duration().as_millis() as u64,
        );

        Ok(TourSolution {
            matrix,
            tour,
            statistics,
        })
    }
}
