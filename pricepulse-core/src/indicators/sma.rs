//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of the trailing `period` closes.
//! No partial means: the first value appears at index period-1.

use super::{window_stats, Indicator};

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        for (i, window) in closes.windows(self.period).enumerate() {
            result[i + self.period - 1] = Some(window_stats(window).0);
        }

        result
    }
}
