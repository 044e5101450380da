//! Optional long/short trade plan sized from the close-only volatility proxy.
//!
//! stop distance   = atr_multiplier * ATR-proxy
//! target distance = reward_ratio * (realised stop distance)
//!
//! The Bollinger bands are not a floor by default. With `BandAnchor::Tighter`
//! or `BandAnchor::Wider` the stop is moved to the band when the band is on
//! the protective side of the entry and is closer / farther than the ATR stop.
//! The plan never feeds back into the probability.

use crate::frame::IndicatorRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandAnchor {
    /// ATR-proxy stop only.
    #[default]
    None,
    /// Use the band when it is closer to the entry than the ATR stop.
    Tighter,
    /// Use the band when it is farther from the entry than the ATR stop.
    Wider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradePlanParams {
    pub atr_multiplier: f64,
    pub reward_ratio: f64,
    pub band_anchor: BandAnchor,
}

impl Default for TradePlanParams {
    fn default() -> Self {
        Self {
            atr_multiplier: 1.5,
            reward_ratio: 2.0,
            band_anchor: BandAnchor::None,
        }
    }
}

/// Entry, stop and target of one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
}

impl TradeLevels {
    pub fn stop_distance(&self) -> f64 {
        (self.entry - self.stop).abs()
    }

    pub fn target_distance(&self) -> f64 {
        (self.target - self.entry).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub atr_proxy: f64,
    pub long: TradeLevels,
    pub short: TradeLevels,
}

impl TradePlanParams {
    /// Build a plan for `row`. `None` without a positive ATR-proxy.
    pub fn plan(&self, row: &IndicatorRow) -> Option<TradePlan> {
        let atr = row.atr_proxy?;
        if atr <= 0.0 || !atr.is_finite() {
            return None;
        }
        let entry = row.close;
        let dist = self.atr_multiplier * atr;

        let long_stop = anchor(
            self.band_anchor,
            entry - dist,
            row.bb_low.filter(|&b| b < entry),
            Side::Long,
        );
        let short_stop = anchor(
            self.band_anchor,
            entry + dist,
            row.bb_up.filter(|&b| b > entry),
            Side::Short,
        );

        let long_risk = entry - long_stop;
        let short_risk = short_stop - entry;

        Some(TradePlan {
            atr_proxy: atr,
            long: TradeLevels {
                entry,
                stop: long_stop,
                target: entry + self.reward_ratio * long_risk,
            },
            short: TradeLevels {
                entry,
                stop: short_stop,
                target: entry - self.reward_ratio * short_risk,
            },
        })
    }
}

#[derive(Clone, Copy)]
enum Side {
    Long,
    Short,
}

fn anchor(mode: BandAnchor, atr_stop: f64, band: Option<f64>, side: Side) -> f64 {
    let Some(band) = band else {
        return atr_stop;
    };
    match (mode, side) {
        (BandAnchor::None, _) => atr_stop,
        (BandAnchor::Tighter, Side::Long) | (BandAnchor::Wider, Side::Short) => atr_stop.max(band),
        (BandAnchor::Wider, Side::Long) | (BandAnchor::Tighter, Side::Short) => atr_stop.min(band),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::{TimeZone, Utc};

    fn row(close: f64, atr: Option<f64>) -> IndicatorRow {
        let mut r = IndicatorRow::bare(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), close);
        r.atr_proxy = atr;
        r.bb_low = Some(97.0);
        r.bb_up = Some(103.0);
        r
    }

    #[test]
    fn atr_only_plan() {
        let plan = TradePlanParams::default().plan(&row(100.0, Some(2.0))).unwrap();
        // stop distance 3, target distance 6
        assert_approx(plan.long.stop, 97.0, DEFAULT_EPSILON);
        assert_approx(plan.long.target, 106.0, DEFAULT_EPSILON);
        assert_approx(plan.short.stop, 103.0, DEFAULT_EPSILON);
        assert_approx(plan.short.target, 94.0, DEFAULT_EPSILON);
        assert_approx(
            plan.long.target_distance(),
            2.0 * plan.long.stop_distance(),
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn no_plan_without_volatility() {
        assert!(TradePlanParams::default().plan(&row(100.0, None)).is_none());
        assert!(TradePlanParams::default().plan(&row(100.0, Some(0.0))).is_none());
    }

    #[test]
    fn tighter_anchor_moves_stop_to_band() {
        let params = TradePlanParams {
            band_anchor: BandAnchor::Tighter,
            ..TradePlanParams::default()
        };
        // ATR stop distance 6 → long 94 / short 106; bands at 97 / 103 are tighter.
        let plan = params.plan(&row(100.0, Some(4.0))).unwrap();
        assert_approx(plan.long.stop, 97.0, DEFAULT_EPSILON);
        assert_approx(plan.long.target, 106.0, DEFAULT_EPSILON);
        assert_approx(plan.short.stop, 103.0, DEFAULT_EPSILON);
        assert_approx(plan.short.target, 94.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wider_anchor_keeps_farther_stop() {
        let params = TradePlanParams {
            band_anchor: BandAnchor::Wider,
            ..TradePlanParams::default()
        };
        // ATR stop distance 1.5 → long 98.5; band 97 is wider.
        let plan = params.plan(&row(100.0, Some(1.0))).unwrap();
        assert_approx(plan.long.stop, 97.0, DEFAULT_EPSILON);
        assert_approx(plan.short.stop, 103.0, DEFAULT_EPSILON);
        // ATR stop distance 6 is already wider than the bands.
        let plan = params.plan(&row(100.0, Some(4.0))).unwrap();
        assert_approx(plan.long.stop, 94.0, DEFAULT_EPSILON);
    }

    #[test]
    fn band_on_wrong_side_is_ignored() {
        let params = TradePlanParams {
            band_anchor: BandAnchor::Tighter,
            ..TradePlanParams::default()
        };
        // close below the lower band: the band cannot protect a long.
        let plan = params.plan(&row(95.0, Some(2.0))).unwrap();
        assert_approx(plan.long.stop, 92.0, DEFAULT_EPSILON);
    }
}
