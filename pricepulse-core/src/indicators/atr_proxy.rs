//! Close-only volatility proxy.
//!
//! A close-only series has no high/low, so a true range cannot be formed.
//! The proxy is the trailing mean of |close[t] - close[t-1]| over `period` deltas.
//! Lookback: period. Used only to size stop distances.

use super::{trailing_gain_loss, Indicator};

#[derive(Debug, Clone)]
pub struct AtrProxy {
    period: usize,
    name: String,
}

impl AtrProxy {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR-proxy period must be >= 1");
        Self {
            period,
            name: format!("atr_proxy_{period}"),
        }
    }
}

impl Indicator for AtrProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        // mean |delta| == mean gain + mean loss over the same window
        trailing_gain_loss(closes, self.period)
            .into_iter()
            .map(|window| window.map(|(gain, loss)| gain + loss))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn atr_proxy_mean_abs_delta() {
        // Deltas: +2, -1, +3, -2
        let result = AtrProxy::new(2).compute(&[10.0, 12.0, 11.0, 14.0, 12.0]);
        assert!(result[..2].iter().all(Option::is_none));
        assert_approx(result[2].unwrap(), 1.5, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 2.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 2.5, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_proxy_flat_is_zero() {
        let result = AtrProxy::new(14).compute(&[50.0; 20]);
        assert_eq!(result[14], Some(0.0));
        assert_eq!(result[19], Some(0.0));
    }

    #[test]
    fn atr_proxy_lookback() {
        assert_eq!(AtrProxy::new(14).lookback(), 14);
    }
}
