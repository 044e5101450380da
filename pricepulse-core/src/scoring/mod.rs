//! Signal scorer: collapses the latest fully-defined frame row into a buy probability.
//!
//! The scorer examines the most recent row on which every field required by
//! the active rule set is defined. Each rule casts one vote in {-1, 0, +1};
//! the summed score in [-n, +n] maps linearly onto [0, 100]. With the five
//! canonical rules that is `probability = (score + 5) * 10`.
//!
//! Without such a row the result is `SignalResult::InsufficientData`, never a
//! number.

pub mod recommendation;
pub mod rules;
pub mod trade_plan;

pub use recommendation::{Bias, Recommendation};
pub use rules::{Rule, RuleSet, RuleVote};
pub use trade_plan::{BandAnchor, TradeLevels, TradePlan, TradePlanParams};

use crate::frame::{Field, IndicatorFrame};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A computed score for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    /// Timestamp of the scored row.
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// Sum of votes, in [-rules, +rules].
    pub score: i32,
    /// Buy probability in [0, 100], rounded to 2 decimals.
    pub probability: f64,
    pub recommendation: Recommendation,
    pub votes: Vec<RuleVote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_plan: Option<TradePlan>,
}

/// Terminal output of the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalResult {
    /// No row has every required indicator defined.
    InsufficientData,
    Scored(SignalScore),
}

impl SignalResult {
    pub fn probability(&self) -> Option<f64> {
        match self {
            SignalResult::InsufficientData => None,
            SignalResult::Scored(s) => Some(s.probability),
        }
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            SignalResult::InsufficientData => None,
            SignalResult::Scored(s) => Some(s.recommendation),
        }
    }

    pub fn as_score(&self) -> Option<&SignalScore> {
        match self {
            SignalResult::InsufficientData => None,
            SignalResult::Scored(s) => Some(s),
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, SignalResult::InsufficientData)
    }
}

/// Map a score in [-max, +max] onto [0, 100], clamped and rounded to 2 decimals.
pub fn score_to_probability(score: i32, max_score: usize) -> f64 {
    if max_score == 0 {
        return 50.0;
    }
    let max = max_score as f64;
    let raw = (score as f64 + max) / (2.0 * max) * 100.0;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Stateless scorer over an `IndicatorFrame`.
#[derive(Debug, Clone, Default)]
pub struct SignalScorer {
    rules: RuleSet,
    trade_plan: Option<TradePlanParams>,
}

impl SignalScorer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            trade_plan: None,
        }
    }

    /// Enable the trade-plan extension.
    pub fn with_trade_plan(mut self, params: TradePlanParams) -> Self {
        self.trade_plan = Some(params);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Fields a row must carry before it can be scored.
    pub fn required_fields(&self) -> Vec<Field> {
        self.rules.required_fields()
    }

    pub fn score(&self, frame: &IndicatorFrame) -> SignalResult {
        let required = self.required_fields();
        let Some(index) = frame.last_complete_index(&required) else {
            return SignalResult::InsufficientData;
        };
        let row = &frame.rows()[index];

        let votes: Vec<RuleVote> = self
            .rules
            .rules()
            .iter()
            .filter_map(|rule| rule.vote(row).map(|vote| RuleVote { rule: *rule, vote }))
            .collect();
        let score: i32 = votes.iter().map(|v| i32::from(v.vote)).sum();
        let probability = score_to_probability(score, self.rules.len());

        SignalResult::Scored(SignalScore {
            timestamp: row.timestamp,
            close: row.close,
            score,
            probability,
            recommendation: Recommendation::from_probability(probability),
            votes,
            trade_plan: self.trade_plan.as_ref().and_then(|p| p.plan(row)),
        })
    }
}
