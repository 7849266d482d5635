//! Tour construction strategies.
//!
//! [`TourBuilder`] is the single entry point: nearest-neighbor
//! construction, optionally followed by 2-opt improvement. Both keep the
//! start fixed and return a permutation.

mod nearest_neighbor;
mod two_opt;

pub use nearest_neighbor::NearestNeighborConstructor;
pub use two_opt::TwoOptImprover;

use calibtour_config::{CalibrationConfig, TourConfig};
use calibtour_core::{DistanceMatrix, Result, Tour};
use tracing::info;

/// Builds a visiting order over a distance matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TourBuilder {
    constructor: NearestNeighborConstructor,
    improver: Option<TwoOptImprover>,
}

impl TourBuilder {
    /// Nearest-neighbor builder from `start`.
    pub fn new(start: usize) -> Self {
        Self {
            constructor: NearestNeighborConstructor::new(start),
            improver: None,
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        let builder = Self::new(config.start_index);
        match config.tour {
            TourConfig::NearestNeighbor => builder,
            TourConfig::TwoOpt { max_passes } => {
                builder.with_improver(TwoOptImprover::with_max_passes(max_passes))
            }
        }
    }

    pub fn with_improver(mut self, improver: TwoOptImprover) -> Self {
        self.improver = Some(improver);
        self
    }

    pub fn start(&self) -> usize {
        self.constructor.start()
    }

    /// Name of the configured strategy, for logs and reports.
    pub fn strategy(&self) -> &'static str {
        if self.improver.is_some() {
            "two_opt"
        } else {
            "nearest_neighbor"
        }
    }

    pub fn build(&self, matrix: &DistanceMatrix) -> Result<Tour> {
        let mut tour = self.constructor.construct(matrix)?;
        if let Some(improver) = &self.improver {
            tour = improver.improve(tour, matrix)?;
        }
        info!(
            event = "tour_built",
            strategy = self.strategy(),
            size = tour.len(),
            cost = tour.cost(matrix),
        );
        Ok(tour)
    }
}
