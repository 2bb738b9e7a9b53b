use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Interval;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered bars for one instrument at one sampling interval.
///
/// Timestamps are strictly increasing: [`BarSeries::new`] sorts its input and
/// keeps only the last bar seen for any given instant. Missing bars are left
/// missing. Deserialisation goes through `new` as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawBarSeries")]
pub struct BarSeries {
    symbol: String,
    interval: Interval,
    bars: Vec<Bar>,
}

#[derive(Deserialize)]
struct RawBarSeries {
    symbol: String,
    interval: Interval,
    bars: Vec<Bar>,
}

impl From<RawBarSeries> for BarSeries {
    fn from(raw: RawBarSeries) -> Self {
        Self::new(raw.symbol, raw.interval, raw.bars)
    }
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, interval: Interval, mut bars: Vec<Bar>) -> Self {
        // Stable sort so that among equal timestamps the later input wins below.
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            interval,
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, oldest first.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
