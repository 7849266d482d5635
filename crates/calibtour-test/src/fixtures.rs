//! Configuration and matrix fixtures with hand-checked answers.
//!
//! # Example
//!
//! ```
//! use calibtour_test::fixtures::{cycle_matrix, indexed_configurations};
//!
//! let set = indexed_configurations(4);
//! assert_eq!(set.len(), 4);
//! assert_eq!(cycle_matrix().get(2, 3), 6.0);
//! ```

use calibtour_core::{
    CalibrationTarget, Configuration, ConfigurationSet, DistanceMatrix, HandleId, TargetSet,
};

/// One-coordinate configurations at the given positions.
pub fn line_configurations(positions: &[f64]) -> ConfigurationSet {
    positions
        .iter()
        .map(|&x| Configuration::new(vec![x]))
        .collect()
}

/// `[0.0]`, `[1.0]`, ... so the first coordinate is the index.
///
/// Pairs with [`TableOracle`](crate::TableOracle) and
/// [`FakePlanner::with_distance_table`](crate::FakePlanner::with_distance_table).
pub fn indexed_configurations(n: usize) -> ConfigurationSet {
    (0..n).map(|i| Configuration::new(vec![i as f64])).collect()
}

/// `|x_i - x_j|` for the given positions.
pub fn line_matrix(positions: &[f64]) -> DistanceMatrix {
    let matrix = DistanceMatrix::from_upper_triangle(positions.len(), |i, j| {
        Ok::<_, ()>((positions[i] - positions[j]).abs())
    });
    match matrix {
        Ok(m) => m,
        Err(()) => unreachable!(),
    }
}

/// Four configurations with distances 1..=6 on the six pairs:
/// d01=1 d02=2 d03=3 d12=4 d13=5 d23=6.
///
/// Greedy from 0 visits `[0, 1, 2, 3]` at cost 11.
pub fn cycle_matrix() -> DistanceMatrix {
    rows(vec![
        vec![0.0, 1.0, 2.0, 3.0],
        vec![1.0, 0.0, 4.0, 5.0],
        vec![2.0, 4.0, 0.0, 6.0],
        vec![3.0, 5.0, 6.0, 0.0],
    ])
}

/// Matrix with deliberate ties: from 0, indices 2 and 3 are both at 1;
/// from 2, indices 1 and 3 are both at 3.
///
/// Lowest-index tie-break from 0 visits `[0, 2, 1, 3]`.
pub fn tie_matrix() -> DistanceMatrix {
    rows(vec![
        vec![0.0, 2.0, 1.0, 1.0],
        vec![2.0, 0.0, 3.0, 5.0],
        vec![1.0, 3.0, 0.0, 3.0],
        vec![1.0, 5.0, 3.0, 0.0],
    ])
}

/// `n` targets on a line: pre-grasp `[i, 0]`, contact `[i, 1]`, handle
/// `box/handle_i`.
pub fn target_set(n: usize) -> TargetSet {
    TargetSet::new(
        (0..n)
            .map(|i| CalibrationTarget {
                pregrasp: Configuration::new(vec![i as f64, 0.0]),
                contact: Configuration::new(vec![i as f64, 1.0]),
                handle: HandleId::new(format!("box/handle_{i}")),
            })
            .collect(),
    )
}

fn rows(rows: Vec<Vec<f64>>) -> DistanceMatrix {
    match DistanceMatrix::from_rows(rows) {
        Ok(m) => m,
        Err(e) => panic!("invalid fixture matrix: {e}"),
    }
}
