//! Indicator trait and concrete close-only indicators.
//!
//! Indicators are pure functions: close column in, aligned column out.
//! The output always has the input's length; `None` marks rows where the
//! window has not accumulated enough history. Undefined values are never
//! replaced by zero or any other placeholder.
//!
//! Multi-output indicators (MACD, Bollinger) are exposed as separate instances
//! per output line, keeping the single-series `Indicator` trait unchanged.
//! Each also has a `compute_all` that produces every line in one pass.

pub mod atr_proxy;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr_proxy::AtrProxy;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdLine};
pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at index t may depend on a close at index t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading rows that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole close column.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Mean and sample variance of a window.
///
/// Uses the shifted-data formulation (offsets from the first element), which
/// keeps constant windows exact: mean == value, variance == 0.
pub(crate) fn window_stats(window: &[f64]) -> (f64, f64) {
    let n = window.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let k = window[0];
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for &x in window {
        let d = x - k;
        sum += d;
        sum_sq += d * d;
    }
    let mean = k + sum / n as f64;
    let variance = if n > 1 {
        ((sum_sq - sum * sum / n as f64) / (n - 1) as f64).max(0.0)
    } else {
        f64::NAN
    };
    (mean, variance)
}

/// Trailing means of gains and losses (as positive magnitudes) over `period` deltas
/// ending at each index. Defined from index `period`.
pub(crate) fn trailing_gain_loss(closes: &[f64], period: usize) -> Vec<Option<(f64, f64)>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }
    for (i, slot) in out.iter_mut().enumerate().skip(period) {
        let mut gains = 0.0;
        let mut losses = 0.0;
        for j in (i + 1 - period)..=i {
            let delta = closes[j] - closes[j - 1];
            if delta > 0.0 {
                gains += delta;
            } else {
                losses -= delta;
            }
        }
        *slot = Some((gains / period as f64, losses / period as f64));
    }
    out
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
