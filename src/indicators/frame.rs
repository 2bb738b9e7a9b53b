// =============================================================================
// Indicator Frame — per-bar indicator values aligned with a BarSeries
// =============================================================================
//
// One `IndicatorRow` per bar. With non-zero periods the shrink-window and
// first-value-seeded calculators define every field for every bar. A field is
// `None` only when a calculator produced nothing or a non-finite value for
// that bar; the trend engine treats `None` as "undefined" and neutralises the
// signals that depend on it.

use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::indicators::macd::macd;
use crate::indicators::rsi::relative_strength_index;
use crate::indicators::sma::{simple_moving_average, volume_moving_average};
use crate::market_data::BarSeries;

/// Derived fields for one bar. Default periods: fast SMA 21, slow SMA 50,
/// RSI 14, MACD 12/26/9, volume average 20.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub volume_ma: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Run every trend indicator over `series`.
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Self {
        let closes = series.closes();
        let volumes = series.volumes();

        let sma_fast = simple_moving_average(&closes, params.sma_fast);
        let sma_slow = simple_moving_average(&closes, params.sma_slow);
        let rsi = relative_strength_index(&closes, params.rsi_period);
        let macd = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
        let volume_ma = volume_moving_average(&volumes, params.volume_ma);

        let rows = (0..series.len())
            .map(|i| IndicatorRow {
                sma_fast: defined(&sma_fast, i),
                sma_slow: defined(&sma_slow, i),
                rsi: defined(&rsi, i),
                macd: defined(&macd.macd, i),
                macd_signal: defined(&macd.signal, i),
                macd_hist: defined(&macd.histogram, i),
                volume_ma: defined(&volume_ma, i),
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }
}

fn defined(values: &[f64], i: usize) -> Option<f64> {
    values.get(i).copied().filter(|v| v.is_finite())
}
