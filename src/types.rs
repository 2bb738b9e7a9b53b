// =============================================================================
// Shared types used across the Aurum trend tool
// =============================================================================

use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Sampling interval of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
}

impl Default for Interval {
    fn default() -> Self {
        Self::Day1
    }
}

impl Interval {
    /// Wall-clock span covered by one bar.
    pub fn duration(self) -> Duration {
        match self {
            Self::Min1 => Duration::minutes(1),
            Self::Min5 => Duration::minutes(5),
            Self::Min15 => Duration::minutes(15),
            Self::Min30 => Duration::minutes(30),
            Self::Hour1 => Duration::hours(1),
            Self::Day1 => Duration::days(1),
            Self::Week1 => Duration::weeks(1),
        }
    }

    /// Interval code understood by the Yahoo chart API.
    pub fn yahoo_code(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "60m",
            Self::Day1 => "1d",
            Self::Week1 => "1wk",
        }
    }

    /// Interval code understood by the Twelve Data `time_series` endpoint.
    pub fn twelvedata_code(self) -> &'static str {
        match self {
            Self::Min1 => "1min",
            Self::Min5 => "5min",
            Self::Min15 => "15min",
            Self::Min30 => "30min",
            Self::Hour1 => "1h",
            Self::Day1 => "1day",
            Self::Week1 => "1week",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Min1 => "1m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
            Self::Week1 => "1wk",
        };
        f.write_str(s)
    }
}

impl FromStr for Interval {
    type Err = String;

    /// Accepts both the short codes (`15m`, `1h`) and the Twelve Data
    /// spellings (`15min`, `1day`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1min" => Ok(Self::Min1),
            "5m" | "5min" => Ok(Self::Min5),
            "15m" | "15min" => Ok(Self::Min15),
            "30m" | "30min" => Ok(Self::Min30),
            "1h" | "60m" | "60min" => Ok(Self::Hour1),
            "1d" | "1day" => Ok(Self::Day1),
            "1w" | "1wk" | "1week" => Ok(Self::Week1),
            other => Err(format!(
                "unsupported interval '{other}', expected one of 1m/5m/15m/30m/1h/1d/1wk"
            )),
        }
    }
}

/// Which upstream market-data service backs the bar provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    Yahoo,
    TwelveData,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Yahoo
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yahoo => write!(f, "Yahoo"),
            Self::TwelveData => write!(f, "TwelveData"),
        }
    }
}
