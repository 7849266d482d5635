//! Tour construction statistics.

use std::time::Duration;

/// Counters and costs for one tour solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourStatistics {
    /// Configurations in the set.
    pub configuration_count: usize,
    /// Distance oracle calls issued.
    pub oracle_calls: u64,
    /// Time spent building the matrix.
    pub matrix_duration: Duration,
    /// Time spent ordering.
    pub tour_duration: Duration,
    /// Cost of visiting in input order.
    pub input_order_cost: f64,
    /// Cost of the built tour.
    pub tour_cost: f64,
}

impl TourStatistics {
    /// Cost saved relative to the input order.
    pub fn savings(&self) -> f64 {
        self.input_order_cost - self.tour_cost
    }

    /// Savings as a fraction of the input order cost.
    pub fn savings_ratio(&self) -> f64 {
        if self.input_order_cost > 0.0 {
            self.savings() / self.input_order_cost
        } else {
            0.0
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.matrix_duration + self.tour_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings() {
        let stats = TourStatistics {
            input_order_cost: 8.0,
            tour_cost: 6.0,
            ..TourStatistics::default()
        };
        assert_eq!(stats.savings(), 2.0);
        assert_eq!(stats.savings_ratio(), 0.25);
    }

    #[test]
    fn test_zero_cost_ratio() {
        assert_eq!(TourStatistics::default().savings_ratio(), 0.0);
    }
}
