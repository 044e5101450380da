//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three bands (one Indicator instance each, or all at once via `compute_all`):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::{window_stats, Indicator};

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn build(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2 (sample stddev)");
        let prefix = match band {
            BollingerBand::Upper => "bb_up",
            BollingerBand::Middle => "bb_mid",
            BollingerBand::Lower => "bb_low",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("{prefix}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Lower)
    }

    pub fn band(&self) -> BollingerBand {
        self.band
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let (middle, upper, lower) = self.compute_all(closes);
        match self.band {
            BollingerBand::Middle => middle,
            BollingerBand::Upper => upper,
            BollingerBand::Lower => lower,
        }
    }
}

type Bands = (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>);

impl Bollinger {
    /// All three bands in one pass: (middle, upper, lower).
    pub fn compute_all(&self, closes: &[f64]) -> Bands {
        let n = closes.len();
        let mut middle = vec![None; n];
        let mut upper = vec![None; n];
        let mut lower = vec![None; n];

        if n < self.period {
            return (middle, upper, lower);
        }

        for (i, window) in closes.windows(self.period).enumerate() {
            let (mean, variance) = window_stats(window);
            let half_width = self.multiplier * variance.sqrt();
            let at = i + self.period - 1;
            middle[at] = Some(mean);
            upper[at] = Some(mean + half_width);
            lower[at] = Some(mean - half_width);
        }

        (middle, upper, lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, Sma, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let mid = Bollinger::middle(3, 2.0).compute(&closes);
        let sma = Sma::new(3).compute(&closes);
        assert_eq!(mid, sma);
        assert!(mid[1].is_none());
        assert_approx(mid[2].unwrap(), 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_uses_sample_stddev() {
        // window [10, 11, 12]: sample stddev = 1.0
        let closes = [10.0, 11.0, 12.0];
        let upper = Bollinger::upper(3, 2.0).compute(&closes);
        let lower = Bollinger::lower(3, 2.0).compute(&closes);
        assert_approx(upper[2].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(lower[2].unwrap(), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let closes = [10.0, 13.0, 11.0, 17.0, 14.0];
        let upper = Bollinger::upper(3, 2.0).compute(&closes);
        let middle = Bollinger::middle(3, 2.0).compute(&closes);
        let lower = Bollinger::lower(3, 2.0).compute(&closes);

        for i in 2..5 {
            let half_width = upper[i].unwrap() - middle[i].unwrap();
            assert!(half_width > 0.0);
            assert_approx(middle[i].unwrap() - lower[i].unwrap(), half_width, 1e-9);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let closes = [100.0; 4];
        let upper = Bollinger::upper(3, 2.0).compute(&closes);
        let lower = Bollinger::lower(3, 2.0).compute(&closes);
        assert_eq!(upper[2], Some(100.0));
        assert_eq!(lower[3], Some(100.0));
    }

    #[test]
    fn bollinger_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
        assert_eq!(Bollinger::upper(20, 2.0).name(), "bb_up_20_2");
    }
}
