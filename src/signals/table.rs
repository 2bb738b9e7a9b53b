// =============================================================================
// Trend Table — the scored series handed to the presentation sinks
// =============================================================================
//
// One row per bar, ordered by timestamp: the bar itself, its indicator values,
// the six signal votes, the score and the label. Sinks only read the table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::IndicatorParams;
use crate::error::TrendError;
use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::market_data::BarSeries;
use crate::regime::{TrendLabel, TrendThresholds};
use crate::signals::trend_score::{SignalBreakdown, TrendEngine};
use crate::types::Interval;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub indicators: IndicatorRow,
    pub signals: SignalBreakdown,
    pub trend_score: i8,
    pub trend_label: TrendLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendTable {
    symbol: String,
    interval: Interval,
    rows: Vec<TrendRow>,
}

impl TrendTable {
    /// Compute indicators, score every bar and assemble the table.
    ///
    /// An empty series is the only failure: nothing can be scored.
    pub fn score(
        series: &BarSeries,
        params: &IndicatorParams,
        thresholds: &TrendThresholds,
    ) -> Result<Self, TrendError> {
        if series.is_empty() {
            return Err(TrendError::DataUnavailable {
                symbol: series.symbol().to_string(),
            });
        }

        let frame = IndicatorFrame::compute(series, params);
        let scored = TrendEngine::new(*thresholds).score(series.bars(), &frame);

        let rows: Vec<TrendRow> = series
            .bars()
            .iter()
            .zip(scored)
            .enumerate()
            .map(|(i, (bar, s))| TrendRow {
                timestamp: bar.timestamp,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                indicators: frame.rows().get(i).copied().unwrap_or_default(),
                signals: s.signals,
                trend_score: s.score,
                trend_label: s.label,
            })
            .collect();

        debug!(
            symbol = series.symbol(),
            rows = rows.len(),
            "trend table built"
        );

        Ok(Self {
            symbol: series.symbol().to_string(),
            interval: series.interval(),
            rows,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn rows(&self) -> &[TrendRow] {
        &self.rows
    }

    /// Most recent row. Always present: an empty table is never built.
    pub fn latest(&self) -> Option<&TrendRow> {
        self.rows.last()
    }

    /// The last `n` rows (all of them if fewer).
    pub fn tail(&self, n: usize) -> &[TrendRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}
