//! Exponential Moving Average (EMA).
//!
//! alpha = 2 / (period + 1)
//! Seed: EMA[0] = close[0].
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Defined from the first sample (lookback 0).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        ema_of_series(closes, self.period)
            .into_iter()
            .map(Some)
            .collect()
    }
}

/// Raw EMA values of an arbitrary series, seeded with its first element.
///
/// Used directly by MACD for the signal line (EMA of the MACD line).
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for &v in values {
        // prev + alpha * (v - prev) is the same recurrence, exact on flat input.
        let ema = match prev {
            None => v,
            Some(p) => p + alpha * (v - p),
        };
        result.push(ema);
        prev = Some(ema);
    }

    result
}
