// =============================================================================
// Trend Regime Classification
// =============================================================================
//
// Maps a bar's trend score to one of three regimes:
//
//   score >= uptrend_score    => UPTREND
//   score <= downtrend_score  => DOWNTREND
//   otherwise                 => SIDEWAYS
//
// Each bar is classified on its own score: no hysteresis, no smoothing.
// Labels can therefore flip on consecutive bars near the cutoffs.
//
// The RSI thresholds are deliberately asymmetric (bullish above 50, bearish
// only below 45). Keep them as configured values; do not "fix" the asymmetry.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// Direction of the market at one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    #[default]
    Sideways,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uptrend => write!(f, "Uptrend"),
            Self::Downtrend => write!(f, "Downtrend"),
            Self::Sideways => write!(f, "Sideways"),
        }
    }
}

/// Tunable cutoffs of the trend engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// RSI strictly above this counts as bullish.
    pub rsi_bullish: f64,
    /// RSI strictly below this counts as bearish.
    pub rsi_bearish: f64,
    /// Minimum score labelled `Uptrend`.
    pub uptrend_score: i8,
    /// Maximum score labelled `Downtrend`.
    pub downtrend_score: i8,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            rsi_bullish: 50.0,
            rsi_bearish: 45.0,
            uptrend_score: 4,
            downtrend_score: -4,
        }
    }
}

impl TrendThresholds {
    /// Label for `score`.
    pub fn classify(&self, score: i8) -> TrendLabel {
        if score >= self.uptrend_score {
            TrendLabel::Uptrend
        } else if score <= self.downtrend_score {
            TrendLabel::Downtrend
        } else {
            TrendLabel::Sideways
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.rsi_bullish.is_finite() && self.rsi_bearish.is_finite()) {
            bail!("invalid thresholds: RSI thresholds must be finite");
        }
        if self.rsi_bearish > self.rsi_bullish {
            bail!(
                "invalid thresholds: rsi_bearish ({}) above rsi_bullish ({})",
                self.rsi_bearish,
                self.rsi_bullish
            );
        }
        if self.downtrend_score >= self.uptrend_score {
            bail!(
                "invalid thresholds: downtrend_score ({}) must be below uptrend_score ({})",
                self.downtrend_score,
                self.uptrend_score
            );
        }
        Ok(())
    }
}
