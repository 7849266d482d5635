//! Pairwise distance matrix.

use crate::error::{CalibrationError, Result};

/// Symmetric, zero-diagonal matrix of non-negative path-oracle costs.
///
/// `get(i, j) == get(j, i)` and `get(i, i) == 0` hold for every matrix
/// produced by the constructors below; there is no mutable access.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "MatrixEntries", into = "MatrixEntries")
)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<f64>,
}

impl DistanceMatrix {
    /// Empty 0x0 matrix.
    pub fn empty() -> Self {
        Self {
            size: 0,
            distances: Vec::new(),
        }
    }

    /// Fills the matrix from the upper triangle.
    ///
    /// `distance` is called exactly once per unordered pair `(i, j)` with
    /// `i < j`, in row-major order. The first error aborts construction.
    pub fn from_upper_triangle<E, F>(size: usize, mut distance: F) -> std::result::Result<Self, E>
    where
        F: FnMut(usize, usize) -> std::result::Result<f64, E>,
    {
        let mut distances = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = distance(i, j)?;
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }
        Ok(Self { size, distances })
    }

    /// Builds a matrix from explicit rows, validating the invariants.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the rows are not square, symmetric, zero on the
    /// diagonal and non-negative.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut distances = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(CalibrationError::InvalidInput(format!(
                    "row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            distances.extend_from_slice(row);
        }
        Self::from_row_major(size, distances)
    }

    /// Builds a matrix from `size * size` row-major entries, validating the
    /// invariants.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on a length mismatch or any entry breaking the
    /// invariants `from_rows` checks.
    pub fn from_row_major(size: usize, distances: Vec<f64>) -> Result<Self> {
        if size.checked_mul(size) != Some(distances.len()) {
            return Err(CalibrationError::InvalidInput(format!(
                "{} entries do not fill a {size}x{size} matrix",
                distances.len()
            )));
        }
        for i in 0..size {
            if distances[i * size + i] != 0.0 {
                return Err(CalibrationError::InvalidInput(format!(
                    "diagonal entry {i} is not zero"
                )));
            }
            for j in (i + 1)..size {
                let d = distances[i * size + j];
                if d != distances[j * size + i] {
                    return Err(CalibrationError::InvalidInput(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ"
                    )));
                }
                if d.is_nan() || d < 0.0 {
                    return Err(CalibrationError::InvalidInput(format!(
                        "entry ({i}, {j}) is not a non-negative distance: {d}"
                    )));
                }
            }
        }
        Ok(Self { size, distances })
    }

    /// Number of configurations (rows).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between configurations `i` and `j`.
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "index out of range");
        self.distances[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.distances[i * self.size..(i + 1) * self.size]
    }

    /// Sum of consecutive distances along `order` (open path, no return leg).
    pub fn path_cost(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }

    /// Indices of the `count` configurations closest to `i`, excluding `i`.
    ///
    /// Sorted by ascending distance; ties keep the lower index first.
    pub fn closest(&self, i: usize, count: usize) -> Vec<usize> {
        let row = self.row(i);
        let mut candidates: Vec<usize> = (0..self.size).filter(|&j| j != i).collect();
        candidates.sort_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));
        candidates.truncate(count);
        candidates
    }
}

/// Serialized form of a [`DistanceMatrix`], checked on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct MatrixEntries {
    size: usize,
    distances: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<MatrixEntries> for DistanceMatrix {
    type Error = CalibrationError;

    fn try_from(entries: MatrixEntries) -> Result<Self> {
        Self::from_row_major(entries.size, entries.distances)
    }
}

#[cfg(feature = "serde")]
impl From<DistanceMatrix> for MatrixEntries {
    fn from(matrix: DistanceMatrix) -> Self {
        Self {
            size: matrix.size,
            distances: matrix.distances,
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_deserialize_round_trip() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: DistanceMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_deserialize_rejects_broken_matrices() {
        let short = r#"{"size":3,"distances":[]}"#;
        assert!(serde_json::from_str::<DistanceMatrix>(short).is_err());

        let asymmetric = r#"{"size":2,"distances":[0.0,1.0,2.0,0.0]}"#;
        assert!(serde_json::from_str::<DistanceMatrix>(asymmetric).is_err());
    }
}
