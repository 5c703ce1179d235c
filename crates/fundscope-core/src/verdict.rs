//! Rule-based BUY/HOLD/SELL recommendation.
//!
//! Four independent criteria contribute points; the Sharpe criterion has two
//! mutually exclusive tiers. All comparisons are strict, so a value sitting
//! exactly on a threshold earns nothing for that tier.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{Fundamentals, Metrics};

pub const SHARPE_STRONG: f64 = 1.0;
pub const SHARPE_MODERATE: f64 = 0.5;
/// Dividend yield threshold, in percent.
pub const DIVIDEND_YIELD_PCT_MIN: f64 = 1.5;
pub const PE_RATIO_MAX: f64 = 25.0;
pub const STRENGTH_52W_MIN: f64 = 0.6;

pub const MAX_SCORE: u8 = 5;

/// Total points awarded, `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Clamps to [`MAX_SCORE`].
    pub fn new(points: u8) -> Self {
        Self(points.min(MAX_SCORE))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Sell,
}

impl Verdict {
    pub const fn from_score(score: Score) -> Self {
        match score.value() {
            4..=u8::MAX => Self::Buy,
            2..=3 => Self::Hold,
            _ => Self::Sell,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Points earned per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub sharpe: u8,
    pub dividend: u8,
    pub valuation: u8,
    pub strength: u8,
}

impl ScoreBreakdown {
    pub fn total(self) -> Score {
        Score::new(self.sharpe + self.dividend + self.valuation + self.strength)
    }
}

pub fn score_breakdown(metrics: &Metrics, fundamentals: &Fundamentals) -> ScoreBreakdown {
    let sharpe = if metrics.sharpe_ratio > SHARPE_STRONG {
        2
    } else if metrics.sharpe_ratio > SHARPE_MODERATE {
        1
    } else {
        0
    };

    // A missing yield scores like a zero yield.
    let dividend_pct = fundamentals.dividend_yield_pct().unwrap_or(0.0);
    let dividend = u8::from(dividend_pct > DIVIDEND_YIELD_PCT_MIN);

    let valuation = u8::from(matches!(fundamentals.pe_ratio, Some(pe) if pe < PE_RATIO_MAX));

    let strength = u8::from(metrics.strength_52w > STRENGTH_52W_MIN);

    ScoreBreakdown {
        sharpe,
        dividend,
        valuation,
        strength,
    }
}

pub fn compute_verdict(metrics: &Metrics, fundamentals: &Fundamentals) -> (Score, Verdict) {
    let score = score_breakdown(metrics, fundamentals).total();
    (score, Verdict::from_score(score))
}
