//! Relative Strength Index (RSI).
//!
//! avg_gain / avg_loss are trailing means of the positive / negative deltas
//! over the last `period` deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (first value at index `period`).
//! One-sided windows are undefined: avg_loss == 0 (flat or only gains) would
//! give an infinite RS, and avg_gain == 0 (only losses) a degenerate RS of 0.
//! Neither surfaces as a fabricated 100 or 0.

use super::{trailing_gain_loss, Indicator};

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        trailing_gain_loss(closes, self.period)
            .into_iter()
            .map(|window| window.and_then(|(gain, loss)| rsi_from_averages(gain, loss)))
            .collect()
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 || avg_gain == 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
