// =============================================================================
// Yahoo Finance chart API client
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?period1=..&period2=..&interval=..
//
// The chart payload is column-oriented: one `timestamp` array and parallel
// `open/high/low/close/volume` arrays that may contain nulls. Rows with a
// missing price are dropped; a missing volume counts as zero.
// =============================================================================

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::ProviderError;
use crate::market_data::provider::BarRequest;
use crate::market_data::{Bar, BarSeries};
use crate::types::Interval;

/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) aurum-trend";

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        debug!(base_url, "YahooClient initialised");

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[instrument(skip(self), name = "yahoo::fetch", fields(symbol = %request.symbol, interval = %request.interval))]
    pub async fn fetch(&self, request: &BarRequest) -> Result<BarSeries, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.symbol);
        let query = [
            ("period1", request.start.timestamp().to_string()),
            ("period2", request.end.timestamp().to_string()),
            ("interval", request.interval.yahoo_code().to_string()),
            ("includePrePost", "false".to_string()),
        ];

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(ProviderError::Api(format!("HTTP {status}: {body}")));
        }

        let series = parse_chart(&request.symbol, request.interval, &body)?;
        debug!(bars = series.len(), "chart decoded");
        Ok(series)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Decode a chart response body into a normalised [`BarSeries`].
fn parse_chart(symbol: &str, interval: Interval, body: &str) -> Result<BarSeries, ProviderError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if let Some(err) = envelope.chart.error {
        if err.code == "Not Found" {
            return Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        return Err(ProviderError::Api(format!("{}: {}", err.code, err.description)));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NoData {
            symbol: symbol.to_string(),
        })?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten().filter(|v| v.is_finite());

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            dropped += 1;
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open, i),
            column(&quote.high, i),
            column(&quote.low, i),
            column(&quote.close, i),
        ) else {
            dropped += 1;
            continue;
        };
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: column(&quote.volume, i).unwrap_or(0.0),
        });
    }

    if dropped > 0 {
        warn!(symbol, dropped, "dropped incomplete chart rows");
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    Ok(BarSeries::new(symbol, interval, bars))
}
