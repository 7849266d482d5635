//! Visiting order over a configuration set.

use crate::error::{CalibrationError, Result};
use crate::matrix::DistanceMatrix;

/// A permutation of `0..n`, read as the order in which configurations are
/// visited. The first entry is the fixed start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<usize>", into = "Vec<usize>"))]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Validates that `order` visits every index in `0..order.len()` exactly once.
    ///
    /// # Errors
    ///
    /// `InvalidInput` naming the first repeated or out-of-range index.
    pub fn new(order: Vec<usize>) -> Result<Self> {
        let n = order.len();
        let mut seen = vec![false; n];
        for &i in &order {
            if i >= n {
                return Err(CalibrationError::InvalidInput(format!(
                    "tour index {i} out of range for {n} configurations"
                )));
            }
            if seen[i] {
                return Err(CalibrationError::InvalidInput(format!(
                    "tour visits index {i} twice"
                )));
            }
            seen[i] = true;
        }
        Ok(Self(order))
    }

    /// Tour that keeps the input order, `0..n`.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn start(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    /// Consecutive `(from, to)` index pairs; `n - 1` of them.
    pub fn legs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    /// Sum of matrix entries along consecutive legs.
    pub fn cost(&self, matrix: &DistanceMatrix) -> f64 {
        matrix.path_cost(&self.0)
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl TryFrom<Vec<usize>> for Tour {
    type Error = CalibrationError;

    fn try_from(order: Vec<usize>) -> Result<Self> {
        Self::new(order)
    }
}

impl From<Tour> for Vec<usize> {
    fn from(tour: Tour) -> Self {
        tour.0
    }
}

impl<'a> IntoIterator for &'a Tour {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
