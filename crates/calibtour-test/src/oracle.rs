//! Table-driven distance oracle.

use calibtour_core::{
    CalibrationError, Configuration, DistanceMatrix, DistanceOracle, PlannerError, Result,
};

/// Looks distances up in a table, using each configuration's first
/// coordinate as its row index.
///
/// Records every call as `(index_a, index_b)` and can fail on one pair.
#[derive(Debug, Clone)]
pub struct TableOracle {
    table: Vec<Vec<f64>>,
    calls: Vec<(usize, usize)>,
    failing: Option<(usize, usize)>,
}

impl TableOracle {
    /// Table of size `n` filled from `distance(i, j)` for `i < j`.
    pub fn from_fn(n: usize, mut distance: impl FnMut(usize, usize) -> f64) -> Self {
        let mut table = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(i, j);
                table[i][j] = d;
                table[j][i] = d;
            }
        }
        Self {
            table,
            calls: Vec::new(),
            failing: None,
        }
    }

    pub fn from_matrix(matrix: &DistanceMatrix) -> Self {
        Self::from_fn(matrix.size(), |i, j| matrix.get(i, j))
    }

    /// Fails whenever the unordered pair `{i, j}` is asked for.
    pub fn failing_on(mut self, i: usize, j: usize) -> Self {
        self.failing = Some((i.min(j), i.max(j)));
        self
    }

    pub fn calls(&self) -> &[(usize, usize)] {
        &self.calls
    }

    fn index(&self, q: &Configuration) -> Result<usize> {
        let i = q.as_slice().first().copied().unwrap_or(-1.0);
        if i < 0.0 || i as usize >= self.table.len() {
            return Err(CalibrationError::InvalidInput(format!(
                "configuration {q} has no row in the distance table"
            )));
        }
        Ok(i as usize)
    }
}

impl DistanceOracle for TableOracle {
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> Result<f64> {
        let i = self.index(a)?;
        let j = self.index(b)?;
        self.calls.push((i, j));
        if self.failing == Some((i.min(j), i.max(j))) {
            return Err(PlannerError::new("getDistance", "injected failure").into());
        }
        Ok(self.table[i][j])
    }
}
