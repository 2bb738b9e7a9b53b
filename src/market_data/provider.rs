// =============================================================================
// Bar Series Provider — the boundary between HTTP and the pure pipeline
// =============================================================================

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::market_data::twelvedata::TwelveDataClient;
use crate::market_data::yahoo::YahooClient;
use crate::market_data::BarSeries;
use crate::types::{Interval, ProviderKind};

/// What to fetch: one symbol, one interval, one half-open time range.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRequest {
    pub symbol: String,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BarRequest {
    /// Range ending now and reaching `days` calendar days back.
    pub fn lookback_days(
        symbol: impl Into<String>,
        interval: Interval,
        days: u32,
    ) -> Result<Self, ProviderError> {
        Self::ending_now(symbol.into(), interval, Duration::try_days(i64::from(days)))
    }

    /// Range ending now and wide enough for roughly `count` bars of
    /// `interval`. Markets close on weekends, so the window is doubled.
    pub fn last_bars(
        symbol: impl Into<String>,
        interval: Interval,
        count: u32,
    ) -> Result<Self, ProviderError> {
        let span = i32::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(2))
            .and_then(|n| interval.duration().checked_mul(n));
        Self::ending_now(symbol.into(), interval, span)
    }

    fn ending_now(
        symbol: String,
        interval: Interval,
        span: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let end = Utc::now();
        let Some(start) = span.and_then(|s| end.checked_sub_signed(s)) else {
            return Err(ProviderError::InvalidRange { symbol });
        };
        Ok(Self {
            symbol,
            interval,
            start,
            end,
        })
    }
}

/// A source of OHLCV bars.
///
/// Implementations return bars ascending by time with no duplicate instants
/// (guaranteed by [`BarSeries::new`]) or [`ProviderError::NoData`] when the
/// range is empty.
pub trait BarProvider {
    fn fetch(
        &self,
        request: &BarRequest,
    ) -> impl Future<Output = Result<BarSeries, ProviderError>> + Send;
}

/// The configured upstream, chosen at startup from [`ProviderConfig::kind`].
#[derive(Clone)]
pub enum MarketDataClient {
    Yahoo(YahooClient),
    TwelveData(TwelveDataClient),
}

impl MarketDataClient {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        debug!(provider = %config.kind, "building market data client");
        match config.kind {
            ProviderKind::Yahoo => Ok(Self::Yahoo(YahooClient::new(
                &config.yahoo_base_url,
                config.timeout_secs,
            )?)),
            ProviderKind::TwelveData => {
                let api_key = config
                    .twelvedata_api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ProviderError::MissingApiKey {
                        provider: "Twelve Data",
                        env_var: crate::config::TWELVEDATA_API_KEY_ENV,
                    })?;
                Ok(Self::TwelveData(TwelveDataClient::new(
                    &config.twelvedata_base_url,
                    api_key,
                    config.timeout_secs,
                )?))
            }
        }
    }
}

impl BarProvider for MarketDataClient {
    async fn fetch(&self, request: &BarRequest) -> Result<BarSeries, ProviderError> {
        match self {
            Self::Yahoo(client) => client.fetch(request).await,
            Self::TwelveData(client) => client.fetch(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_spans_requested_days() {
        let req = BarRequest::lookback_days("GC=F", Interval::Day1, 365).unwrap();
        assert_eq!(req.end - req.start, Duration::days(365));
        assert_eq!(req.symbol, "GC=F");
    }

    #[test]
    fn last_bars_doubles_the_window() {
        let req = BarRequest::last_bars("XAU/USD", Interval::Min30, 100).unwrap();
        assert_eq!(req.end - req.start, Duration::minutes(30 * 200));
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let err = BarRequest::lookback_days("GC=F", Interval::Day1, u32::MAX).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRange { ref symbol } if symbol == "GC=F"));

        assert!(BarRequest::last_bars("GC=F", Interval::Week1, u32::MAX).is_err());
        assert!(BarRequest::last_bars("GC=F", Interval::Week1, 2_000_000_000).is_err());
    }

    #[test]
    fn twelvedata_without_key_is_rejected() {
        let config = ProviderConfig {
            kind: ProviderKind::TwelveData,
            twelvedata_api_key: None,
            ..ProviderConfig::default()
        };
        let err = MarketDataClient::from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }

    #[test]
    fn yahoo_needs_no_key() {
        let config = ProviderConfig::default();
        let client = MarketDataClient::from_config(&config).unwrap();
        assert!(matches!(client, MarketDataClient::Yahoo(_)));
    }
}
