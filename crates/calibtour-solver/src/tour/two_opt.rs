//! 2-opt local improvement of an open tour.

use calibtour_core::{CalibrationError, DistanceMatrix, Result, Tour};
use tracing::debug;

/// Improvements smaller than this are ignored, so float noise cannot cycle.
const MIN_IMPROVEMENT: f64 = 1e-9;

/// Repeatedly reverses tour segments while doing so shortens the path.
///
/// The tour is an open path (no return edge), so reversing a suffix only
/// changes one edge. Position 0 never moves. First-improvement: each
/// improving reversal is applied immediately and scanning continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TwoOptImprover {
    max_passes: Option<usize>,
}

impl TwoOptImprover {
    /// Improver that runs until a full pass finds nothing.
    pub fn new() -> Self {
        Self { max_passes: None }
    }

    pub fn with_max_passes(max_passes: Option<usize>) -> Self {
        Self { max_passes }
    }

    pub fn max_passes(&self) -> Option<usize> {
        self.max_passes
    }

    /// Returns an improved tour with the same start and a cost no higher
    /// than the input's.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the tour and matrix sizes differ.
    pub fn improve(&self, tour: Tour, matrix: &DistanceMatrix) -> Result<Tour> {
        if tour.len() != matrix.size() {
            return Err(CalibrationError::InvalidInput(format!(
                "tour of {} configurations over a {}x{} matrix",
                tour.len(),
                matrix.size(),
                matrix.size()
            )));
        }
        let mut order = tour.into_inner();
        let n = order.len();
        let mut passes = 0;
        let mut reversals = 0u64;

        while n >= 3 && self.max_passes.map_or(true, |max| passes < max) {
            passes += 1;
            let mut improved = false;
            for i in 1..n - 1 {
                for j in (i + 1)..n {
                    let delta = reversal_delta(&order, matrix, i, j);
                    if delta < -MIN_IMPROVEMENT {
                        order[i..=j].reverse();
                        reversals += 1;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }

        debug!(
            event = "two_opt",
            passes = passes,
            reversals = reversals,
            cost = matrix.path_cost(&order),
        );
        Tour::new(order)
    }
}

/// Cost change of reversing `order[i..=j]`, with `1 <= i < j < n`.
fn reversal_delta(order: &[usize], matrix: &DistanceMatrix, i: usize, j: usize) -> f64 {
    let before = order[i - 1];
    let first = order[i];
    let last = order[j];
    let mut delta = matrix.get(before, last) - matrix.get(before, first);
    if let Some(&after) = order.get(j + 1) {
        delta += matrix.get(first, after) - matrix.get(last, after);
    }
    delta
}
