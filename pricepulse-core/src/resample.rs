//! Downsampling of a fine-grained series into coarser fixed-width buckets.
//!
//! Buckets are aligned to the Unix epoch: a sample at `ts` falls into the
//! bucket starting at `floor(ts / width) * width`. Each non-empty bucket emits
//! one point labelled with the bucket start and carrying the price of the
//! last sample inside it. Empty buckets emit nothing (no interpolation).

use crate::domain::{BarInterval, PricePoint, PriceSeries};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Resample `series` into buckets of `bucket` width, keeping the last close per bucket.
///
/// An empty input yields an empty output. A non-positive width leaves the
/// series unchanged.
pub fn resample_last(series: &PriceSeries, bucket: Duration) -> PriceSeries {
    let width = bucket.num_seconds();
    if series.is_empty() || width <= 0 {
        return series.clone();
    }

    let mut out: Vec<PricePoint> = Vec::new();
    for point in series.points() {
        let start = bucket_start(point.timestamp, width);
        match out.last_mut() {
            // Input is strictly increasing, so samples of one bucket are contiguous.
            Some(last) if last.timestamp == start => last.close = point.close,
            _ => out.push(PricePoint::new(start, point.close)),
        }
    }

    debug!(
        input = series.len(),
        output = out.len(),
        width_secs = width,
        "resampled series"
    );

    PriceSeries::from_sorted_unchecked(out)
}

/// Resample to a target bar interval.
pub fn resample_to(series: &PriceSeries, target: BarInterval) -> PriceSeries {
    resample_last(series, target.duration())
}

/// Epoch-aligned start of the bucket containing `ts`.
pub fn bucket_start(ts: DateTime<Utc>, width_secs: i64) -> DateTime<Utc> {
    let secs = ts.timestamp();
    let start = secs.div_euclid(width_secs) * width_secs;
    DateTime::from_timestamp(start, 0).unwrap_or(ts)
}
