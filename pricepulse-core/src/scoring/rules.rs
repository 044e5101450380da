//! Voting rules for the signal scorer.
//!
//! Each rule looks at a single fully-defined row and casts exactly one vote
//! in {-1, 0, +1}. Rules are independent; none can vote twice.

use crate::frame::{Field, IndicatorRow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single ±1 voting rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// close > SMA: +1, else -1.
    PriceAboveSma,
    /// close > EMA: +1, else -1.
    PriceAboveEma,
    /// RSI below `oversold`: +1; above `overbought`: -1; otherwise 0.
    RsiExtremes { oversold: f64, overbought: f64 },
    /// MACD line > signal line: +1, else -1.
    MacdAboveSignal,
    /// close below the lower band: +1; above the upper band: -1; otherwise 0.
    BollingerReversion,
}

impl Rule {
    pub const RSI_DEFAULT: Rule = Rule::RsiExtremes {
        oversold: 30.0,
        overbought: 70.0,
    };

    /// Fields that must be defined on a row for this rule to vote.
    pub fn required(&self) -> &'static [Field] {
        match self {
            Rule::PriceAboveSma => &[Field::Close, Field::Sma],
            Rule::PriceAboveEma => &[Field::Close, Field::Ema],
            Rule::RsiExtremes { .. } => &[Field::Rsi],
            Rule::MacdAboveSignal => &[Field::Macd, Field::MacdSignal],
            Rule::BollingerReversion => &[Field::Close, Field::BbUp, Field::BbLow],
        }
    }

    /// Stable name of the rule kind, ignoring parameters.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::PriceAboveSma => "price_above_sma",
            Rule::PriceAboveEma => "price_above_ema",
            Rule::RsiExtremes { .. } => "rsi_extremes",
            Rule::MacdAboveSignal => "macd_above_signal",
            Rule::BollingerReversion => "bollinger_reversion",
        }
    }

    /// Cast this rule's vote. `None` if a required field is undefined.
    pub fn vote(&self, row: &IndicatorRow) -> Option<i8> {
        let close = row.close;
        let vote = match *self {
            Rule::PriceAboveSma => above(close, row.sma?),
            Rule::PriceAboveEma => above(close, row.ema?),
            Rule::RsiExtremes {
                oversold,
                overbought,
            } => {
                let rsi = row.rsi?;
                if rsi < oversold {
                    1
                } else if rsi > overbought {
                    -1
                } else {
                    0
                }
            }
            Rule::MacdAboveSignal => above(row.macd?, row.macd_signal?),
            Rule::BollingerReversion => {
                let (low, up) = (row.bb_low?, row.bb_up?);
                if close < low {
                    1
                } else if close > up {
                    -1
                } else {
                    0
                }
            }
        };
        Some(vote)
    }
}

fn above(value: f64, reference: f64) -> i8 {
    if value > reference {
        1
    } else {
        -1
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::PriceAboveSma => write!(f, "close vs SMA"),
            Rule::PriceAboveEma => write!(f, "close vs EMA"),
            Rule::RsiExtremes {
                oversold,
                overbought,
            } => write!(f, "RSI outside {oversold}/{overbought}"),
            Rule::MacdAboveSignal => write!(f, "MACD vs signal"),
            Rule::BollingerReversion => write!(f, "close vs Bollinger bands"),
        }
    }
}

/// One rule's contribution to a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleVote {
    pub rule: Rule,
    pub vote: i8,
}

/// The active rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The five canonical rules; score range [-5, +5].
    pub fn canonical() -> Self {
        Self::new(vec![
            Rule::PriceAboveSma,
            Rule::PriceAboveEma,
            Rule::RSI_DEFAULT,
            Rule::MacdAboveSignal,
            Rule::BollingerReversion,
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule kind listed more than once, if any.
    pub fn duplicate_kind(&self) -> Option<&'static str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(Rule::kind)
            .find(|kind| !seen.insert(*kind))
    }

    /// Union of required fields across all rules, deduplicated.
    pub fn required_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self
            .rules
            .iter()
            .flat_map(|r| r.required().iter().copied())
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(close: f64) -> IndicatorRow {
        let mut r = IndicatorRow::bare(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), close);
        r.sma = Some(100.0);
        r.ema = Some(100.0);
        r.rsi = Some(50.0);
        r.macd = Some(0.5);
        r.macd_signal = Some(0.2);
        r.bb_up = Some(110.0);
        r.bb_low = Some(90.0);
        r
    }

    #[test]
    fn trend_rules_vote_on_strict_comparison() {
        assert_eq!(Rule::PriceAboveSma.vote(&row(101.0)), Some(1));
        assert_eq!(Rule::PriceAboveSma.vote(&row(100.0)), Some(-1));
        assert_eq!(Rule::PriceAboveEma.vote(&row(99.0)), Some(-1));
    }

    #[test]
    fn rsi_rule_has_neutral_zone() {
        let mut r = row(100.0);
        assert_eq!(Rule::RSI_DEFAULT.vote(&r), Some(0));
        r.rsi = Some(29.9);
        assert_eq!(Rule::RSI_DEFAULT.vote(&r), Some(1));
        r.rsi = Some(70.1);
        assert_eq!(Rule::RSI_DEFAULT.vote(&r), Some(-1));
        r.rsi = Some(70.0);
        assert_eq!(Rule::RSI_DEFAULT.vote(&r), Some(0));
    }

    #[test]
    fn bollinger_rule_votes_for_reversion() {
        assert_eq!(Rule::BollingerReversion.vote(&row(89.0)), Some(1));
        assert_eq!(Rule::BollingerReversion.vote(&row(111.0)), Some(-1));
        assert_eq!(Rule::BollingerReversion.vote(&row(100.0)), Some(0));
    }

    #[test]
    fn macd_rule() {
        let mut r = row(100.0);
        assert_eq!(Rule::MacdAboveSignal.vote(&r), Some(1));
        r.macd = Some(0.2);
        assert_eq!(Rule::MacdAboveSignal.vote(&r), Some(-1));
    }

    #[test]
    fn missing_field_means_no_vote() {
        let mut r = row(100.0);
        r.rsi = None;
        assert_eq!(Rule::RSI_DEFAULT.vote(&r), None);
    }

    #[test]
    fn canonical_required_fields() {
        let fields = RuleSet::canonical().required_fields();
        assert_eq!(
            fields,
            vec![
                Field::Close,
                Field::Sma,
                Field::Ema,
                Field::Rsi,
                Field::Macd,
                Field::MacdSignal,
                Field::BbUp,
                Field::BbLow,
            ]
        );
    }

    #[test]
    fn rule_set_serializes_as_list() {
        let json = serde_json::to_string(&RuleSet::new(vec![Rule::MacdAboveSignal])).unwrap();
        assert_eq!(json, r#"[{"type":"macd_above_signal"}]"#);
    }

    #[test]
    fn duplicate_kind_ignores_parameters() {
        assert_eq!(RuleSet::canonical().duplicate_kind(), None);
        let rules = RuleSet::new(vec![
            Rule::RSI_DEFAULT,
            Rule::PriceAboveSma,
            Rule::RsiExtremes {
                oversold: 20.0,
                overbought: 80.0,
            },
        ]);
        assert_eq!(rules.duplicate_kind(), Some("rsi_extremes"));
    }
}
