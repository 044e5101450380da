//! Probability → recommendation mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-level recommendation derived from the buy probability.
///
/// Thresholds (inclusive lower bounds): 70 strong buy, 55 buy, 45 hold,
/// 30 sell, below 30 strong sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

/// Three-way collapse of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 70.0 {
            Recommendation::StrongBuy
        } else if probability >= 55.0 {
            Recommendation::Buy
        } else if probability >= 45.0 {
            Recommendation::Hold
        } else if probability >= 30.0 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }

    pub fn bias(self) -> Bias {
        match self {
            Recommendation::StrongBuy | Recommendation::Buy => Bias::Buy,
            Recommendation::Hold => Bias::Hold,
            Recommendation::Sell | Recommendation::StrongSell => Bias::Sell,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "strong buy",
            Recommendation::Buy => "buy",
            Recommendation::Hold => "hold",
            Recommendation::Sell => "sell",
            Recommendation::StrongSell => "strong sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bias::Buy => "buy",
            Bias::Hold => "hold",
            Bias::Sell => "sell",
        })
    }
}
