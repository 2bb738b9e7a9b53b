// =============================================================================
// Pipeline — provider fetch followed by the pure computations
// =============================================================================
//
// Each run is shared-nothing: one fetch, one synchronous computation over the
// returned series. Multi-symbol and multi-interval runs poll the independent
// fetches concurrently with `join_all` and keep per-item results, so one
// missing symbol never aborts the others.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{IndicatorParams, ProfileParams, SnapshotParams};
use crate::error::TrendError;
use crate::indicators::atr::calculate_atr;
use crate::indicators::bollinger::{bollinger_bands, BollingerBands};
use crate::indicators::obv::on_balance_volume;
use crate::indicators::rsi::wilder_rsi;
use crate::indicators::volume_profile::{key_levels, price_range, volume_profile, VolumeProfile};
use crate::market_data::{BarProvider, BarRequest, BarSeries};
use crate::regime::TrendThresholds;
use crate::signals::TrendTable;
use crate::types::Interval;

// =============================================================================
// Trend
// =============================================================================

/// Fetch one series and score it.
pub async fn analyze_trend<P: BarProvider>(
    provider: &P,
    request: &BarRequest,
    params: &IndicatorParams,
    thresholds: &TrendThresholds,
) -> Result<TrendTable, TrendError> {
    let series = provider.fetch(request).await?;
    let table = TrendTable::score(&series, params, thresholds)?;

    if let Some(latest) = table.latest() {
        info!(
            symbol = %request.symbol,
            interval = %request.interval,
            bars = table.rows().len(),
            score = latest.trend_score,
            label = %latest.trend_label,
            "trend scored"
        );
    }
    Ok(table)
}

/// Score every request concurrently. Results keep the request order.
pub async fn analyze_many<P: BarProvider>(
    provider: &P,
    requests: &[BarRequest],
    params: &IndicatorParams,
    thresholds: &TrendThresholds,
) -> Vec<Result<TrendTable, TrendError>> {
    join_all(
        requests
            .iter()
            .map(|request| analyze_trend(provider, request, params, thresholds)),
    )
    .await
}

// =============================================================================
// Snapshot
// =============================================================================

/// Latest readings of the short-horizon indicators. A field is `None` when
/// the series is too short for that indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: String,
    pub interval: Interval,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub obv: Option<f64>,
    pub atr: Option<f64>,
}

pub fn compute_snapshot(series: &BarSeries, params: &SnapshotParams) -> Result<Snapshot, TrendError> {
    let last = series.last().ok_or_else(|| TrendError::DataUnavailable {
        symbol: series.symbol().to_string(),
    })?;

    let closes = series.closes();
    let volumes = series.volumes();

    Ok(Snapshot {
        symbol: series.symbol().to_string(),
        interval: series.interval(),
        timestamp: last.timestamp,
        close: last.close,
        rsi: wilder_rsi(&closes, params.rsi_period).last().copied(),
        bollinger: bollinger_bands(&closes, params.bollinger_period, params.bollinger_std),
        obv: on_balance_volume(&closes, &volumes).last().copied(),
        atr: calculate_atr(series.bars(), params.atr_period),
    })
}

pub async fn fetch_snapshot<P: BarProvider>(
    provider: &P,
    params: &SnapshotParams,
) -> Result<Snapshot, TrendError> {
    let request = BarRequest::last_bars(params.symbol.as_str(), params.interval, params.bars)?;
    let series = provider.fetch(&request).await?;

    if series.len() < params.bars as usize {
        warn!(
            symbol = %params.symbol,
            requested = params.bars,
            received = series.len(),
            "fewer bars than requested"
        );
    }

    compute_snapshot(&series, params)
}

// =============================================================================
// Volume profile
// =============================================================================

/// Volume profile of one interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalProfile {
    pub interval: Interval,
    pub bars: usize,
    pub low: f64,
    pub high: f64,
    pub profile: VolumeProfile,
}

pub fn compute_profile(series: &BarSeries, price_bin: f64) -> Result<IntervalProfile, TrendError> {
    let (low, high) = price_range(series.bars()).ok_or_else(|| TrendError::DataUnavailable {
        symbol: series.symbol().to_string(),
    })?;

    Ok(IntervalProfile {
        interval: series.interval(),
        bars: series.len(),
        low,
        high,
        profile: volume_profile(series.bars(), price_bin),
    })
}

/// Per-interval profiles plus one set of key levels spanning the combined
/// low / high of every interval that returned data.
#[derive(Debug)]
pub struct ProfileReport {
    pub symbol: String,
    pub intervals: Vec<(Interval, Result<IntervalProfile, TrendError>)>,
    /// Combined traded range, `None` when no interval had data.
    pub range: Option<(f64, f64)>,
    /// `(step, levels)` for each configured grid.
    pub key_levels: Vec<(f64, Vec<f64>)>,
}

impl ProfileReport {
    pub fn new(
        symbol: impl Into<String>,
        intervals: Vec<(Interval, Result<IntervalProfile, TrendError>)>,
        steps: &[f64],
    ) -> Self {
        let range = intervals
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .map(|p| (p.low, p.high))
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));

        let key_levels = match range {
            Some((low, high)) => steps
                .iter()
                .map(|&step| (step, key_levels(low, high, step)))
                .collect(),
            None => Vec::new(),
        };

        Self {
            symbol: symbol.into(),
            intervals,
            range,
            key_levels,
        }
    }

    /// True when at least one interval produced a profile.
    pub fn has_data(&self) -> bool {
        self.range.is_some()
    }
}

/// One profile per configured interval, fetched concurrently.
pub async fn fetch_profiles<P: BarProvider>(provider: &P, params: &ProfileParams) -> ProfileReport {
    let runs = params
        .intervals
        .iter()
        .map(|&interval| async move { (interval, profile_interval(provider, params, interval).await) });
    let intervals = join_all(runs).await;
    ProfileReport::new(params.symbol.as_str(), intervals, &params.key_level_steps)
}

async fn profile_interval<P: BarProvider>(
    provider: &P,
    params: &ProfileParams,
    interval: Interval,
) -> Result<IntervalProfile, TrendError> {
    let request = BarRequest::lookback_days(params.symbol.as_str(), interval, params.lookback_days)?;
    let series = provider.fetch(&request).await?;
    compute_profile(&series, params.price_bin)
}
