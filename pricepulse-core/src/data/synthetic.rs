//! Deterministic synthetic prices for demos and offline runs.
//!
//! Produces a multiplicative random walk. The RNG is seeded from
//! BLAKE3(ticker, interval), so the same request always yields the same
//! closes. These series are clearly fake.

use super::provider::{parse_range, FetchError, FetchRequest, PriceProvider};
use crate::domain::{BarInterval, PricePoint, PriceSeries};
use crate::resample::bucket_start;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    anchor: DateTime<Utc>,
    max_bars: usize,
}

impl SyntheticProvider {
    pub const DEFAULT_MAX_BARS: usize = 2_000;

    /// Series end at the current time.
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Series end at a fixed instant (reproducible timestamps).
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            max_bars: Self::DEFAULT_MAX_BARS,
        }
    }

    pub fn with_max_bars(mut self, max_bars: usize) -> Self {
        self.max_bars = max_bars.max(1);
        self
    }

    fn rng_for(ticker: &str, interval: BarInterval) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ticker.as_bytes());
        hasher.update(b"|");
        hasher.update(interval.code().as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    fn bar_count(&self, request: &FetchRequest) -> usize {
        let step = request.interval.seconds();
        match parse_range(&request.range) {
            Some(span) => {
                let bars = span.num_seconds() / step;
                (bars.max(1) as usize).min(self.max_bars)
            }
            None => self.max_bars,
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let step = request.interval.seconds();
        let count = self.bar_count(request);
        let mut rng = Self::rng_for(&request.ticker, request.interval);

        // Daily-scale volatility, shrunk for intraday bars.
        let vol = 0.03 * (step as f64 / 86_400.0).sqrt();
        let mut price: f64 = rng.gen_range(20.0..2_000.0);

        let last_start = bucket_start(self.anchor, step).timestamp();
        let first_start = last_start - step * (count as i64 - 1);

        let mut points = Vec::with_capacity(count);
        for i in 0..count as i64 {
            let secs = first_start + i * step;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| FetchError::Other(format!("timestamp out of range: {secs}")))?;
            let ret: f64 = rng.gen_range(-vol..vol);
            price *= 1.0 + ret;
            points.push(PricePoint::new(timestamp, price));
        }

        Ok(PriceSeries::new(points)?)
    }
}
