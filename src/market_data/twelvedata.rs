// =============================================================================
// Twelve Data REST client — /time_series
// =============================================================================
//
// SECURITY: the API key is injected from configuration (environment) and is
// never logged. Twelve Data sends prices as JSON strings and orders values
// newest first; `BarSeries::new` restores ascending order.
// =============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::market_data::provider::BarRequest;
use crate::market_data::{Bar, BarSeries};
use crate::types::Interval;

/// Upper bound accepted by the endpoint for a single call.
const MAX_OUTPUT_SIZE: u32 = 5000;

#[derive(Clone)]
pub struct TwelveDataClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TwelveDataClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        debug!(base_url, "TwelveDataClient initialised");

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    #[instrument(skip(self), name = "twelvedata::fetch", fields(symbol = %request.symbol, interval = %request.interval))]
    pub async fn fetch(&self, request: &BarRequest) -> Result<BarSeries, ProviderError> {
        let url = format!("{}/time_series", self.base_url);
        let query = [
            ("symbol", request.symbol.clone()),
            ("interval", request.interval.twelvedata_code().to_string()),
            ("start_date", request.start.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("end_date", request.end.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("timezone", "UTC".to_string()),
            ("outputsize", MAX_OUTPUT_SIZE.to_string()),
            ("apikey", self.api_key.clone()),
        ];

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(ProviderError::Api(format!("HTTP {status}: {body}")));
        }

        let series = parse_time_series(&request.symbol, request.interval, &body)?;
        debug!(bars = series.len(), "time series decoded");
        Ok(series)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<TimeSeriesValue>>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

fn parse_time_series(
    symbol: &str,
    interval: Interval,
    body: &str,
) -> Result<BarSeries, ProviderError> {
    let resp: TimeSeriesResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if resp.status.as_deref() == Some("error") {
        let message = resp.message.unwrap_or_default();
        if resp.code == Some(400) && message.to_ascii_lowercase().contains("no data") {
            return Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        return Err(ProviderError::Api(format!(
            "code {}: {}",
            resp.code.unwrap_or_default(),
            message
        )));
    }

    let values = resp.values.unwrap_or_default();
    if values.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let bars = values
        .iter()
        .map(parse_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BarSeries::new(symbol, interval, bars))
}

fn parse_value(value: &TimeSeriesValue) -> Result<Bar, ProviderError> {
    Ok(Bar {
        timestamp: parse_datetime(&value.datetime)?,
        open: parse_string_f64(&value.open, "open")?,
        high: parse_string_f64(&value.high, "high")?,
        low: parse_string_f64(&value.low, "low")?,
        close: parse_string_f64(&value.close, "close")?,
        volume: match value.volume.as_deref() {
            Some(v) => parse_string_f64(v, "volume")?,
            None => 0.0,
        },
    })
}

/// Intraday values carry a time, daily and weekly values only a date.
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, ProviderError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ProviderError::Decode(format!("unparseable datetime: {raw}")))
}

fn parse_string_f64(raw: &str, name: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProviderError::Decode(format!("failed to parse {name} as f64: {raw}")))
}
