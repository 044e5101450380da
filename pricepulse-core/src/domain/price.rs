//! PricePoint and PriceSeries: the close-only market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One closing price sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Rejection reasons for a price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("timestamp at index {index} is not strictly after its predecessor")]
    NonIncreasingTimestamp { index: usize },

    #[error("invalid close price {price} at index {index} (must be finite and > 0)")]
    InvalidPrice { index: usize, price: f64 },
}

/// Ordered close-price series.
///
/// Invariants, checked at construction:
/// - timestamps strictly increasing (no duplicates)
/// - every close is finite and > 0
///
/// Immutable once built; indicator and resampling stages produce new values
/// rather than mutating the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a validated series.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    index: i,
                    price: p.close,
                });
            }
            if i > 0 && p.timestamp <= points[i - 1].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp { index: i });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from (timestamp, close) pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, close)| PricePoint { timestamp, close })
                .collect(),
        )
    }

    /// Empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap points already known to satisfy the invariants.
    ///
    /// Used by stages whose output is ordered by construction (the resampler).
    pub(crate) fn from_sorted_unchecked(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The close column as a plain vector.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        PriceSeries::new(points).map_err(serde::de::Error::custom)
    }
}
