//! Bar intervals: the bar sizes a provider can deliver and the resampler can target.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bar interval '{0}' (expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w)")]
pub struct IntervalParseError(pub String);

/// Fixed-width bar size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BarInterval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

impl BarInterval {
    pub const ALL: [BarInterval; 8] = [
        BarInterval::OneMinute,
        BarInterval::FiveMinutes,
        BarInterval::FifteenMinutes,
        BarInterval::ThirtyMinutes,
        BarInterval::OneHour,
        BarInterval::FourHours,
        BarInterval::OneDay,
        BarInterval::OneWeek,
    ];

    /// Width of one bar in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            BarInterval::OneMinute => 60,
            BarInterval::FiveMinutes => 5 * 60,
            BarInterval::FifteenMinutes => 15 * 60,
            BarInterval::ThirtyMinutes => 30 * 60,
            BarInterval::OneHour => 60 * 60,
            BarInterval::FourHours => 4 * 60 * 60,
            BarInterval::OneDay => 24 * 60 * 60,
            BarInterval::OneWeek => 7 * 24 * 60 * 60,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// Canonical short code, also used for display and serialization.
    pub fn code(self) -> &'static str {
        match self {
            BarInterval::OneMinute => "1m",
            BarInterval::FiveMinutes => "5m",
            BarInterval::FifteenMinutes => "15m",
            BarInterval::ThirtyMinutes => "30m",
            BarInterval::OneHour => "1h",
            BarInterval::FourHours => "4h",
            BarInterval::OneDay => "1d",
            BarInterval::OneWeek => "1w",
        }
    }

    /// Interval code understood by Yahoo's chart API, if it serves this size natively.
    ///
    /// Yahoo has no 4h bars; those are built by resampling 1h data.
    pub fn yahoo_code(self) -> Option<&'static str> {
        match self {
            BarInterval::OneMinute => Some("1m"),
            BarInterval::FiveMinutes => Some("5m"),
            BarInterval::FifteenMinutes => Some("15m"),
            BarInterval::ThirtyMinutes => Some("30m"),
            BarInterval::OneHour => Some("60m"),
            BarInterval::FourHours => None,
            BarInterval::OneDay => Some("1d"),
            BarInterval::OneWeek => Some("1wk"),
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BarInterval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1min" => Ok(BarInterval::OneMinute),
            "5m" | "5min" => Ok(BarInterval::FiveMinutes),
            "15m" | "15min" => Ok(BarInterval::FifteenMinutes),
            "30m" | "30min" => Ok(BarInterval::ThirtyMinutes),
            "1h" | "60m" | "60min" => Ok(BarInterval::OneHour),
            "4h" | "240m" => Ok(BarInterval::FourHours),
            "1d" | "24h" => Ok(BarInterval::OneDay),
            "1w" | "1wk" | "7d" => Ok(BarInterval::OneWeek),
            _ => Err(IntervalParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for BarInterval {
    type Error = IntervalParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BarInterval> for String {
    fn from(value: BarInterval) -> Self {
        value.code().to_string()
    }
}
