//! Greedy nearest-neighbor tour construction.

use calibtour_core::{CalibrationError, DistanceMatrix, Result, Tour};
use tracing::trace;

/// Builds a tour by always moving to the closest unvisited configuration.
///
/// Deterministic: among equidistant candidates the lowest index wins.
/// O(n²) time, no optimality guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestNeighborConstructor {
    start: usize,
}

impl NearestNeighborConstructor {
    pub fn new(start: usize) -> Self {
        Self { start }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Constructs a tour starting at the configured start index.
    ///
    /// An empty matrix yields an empty tour whatever the start.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the start index is outside a non-empty matrix.
    pub fn construct(&self, matrix: &DistanceMatrix) -> Result<Tour> {
        let n = matrix.size();
        if n == 0 {
            return Ok(Tour::empty());
        }
        if self.start >= n {
            return Err(CalibrationError::InvalidInput(format!(
                "start index {} out of range for {n} configurations",
                self.start
            )));
        }

        let mut visited = Vec::with_capacity(n);
        let mut remaining = vec![true; n];
        visited.push(self.start);
        remaining[self.start] = false;

        let mut last = self.start;
        for step in 1..n {
            let mut closest: Option<(usize, f64)> = None;
            for (j, &free) in remaining.iter().enumerate() {
                if !free {
                    continue;
                }
                let d = matrix.get(last, j);
                // Strict comparison keeps the lowest index on ties.
                if closest.map_or(true, |(_, best)| d < best) {
                    closest = Some((j, d));
                }
            }
            let Some((next, d)) = closest else {
                break;
            };
            trace!(event = "nearest", step = step, from = last, to = next, distance = d);
            remaining[next] = false;
            visited.push(next);
            last = next;
        }

        Tour::new(visited)
    }
}

impl Default for NearestNeighborConstructor {
    fn default() -> Self {
        Self::new(0)
    }
}
