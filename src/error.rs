// =============================================================================
// Domain errors
// =============================================================================
//
// Typed errors for the provider boundary and the trend pipeline. Everything
// above the pipeline (config, CLI, sinks) works in `anyhow::Result`.

use thiserror::Error;

/// Errors raised by a [`crate::market_data::BarProvider`] implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested range produced no bars at all.
    #[error("no bars returned for {symbol}")]
    NoData { symbol: String },

    /// Network failure, timeout or non-JSON body.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service answered with an explicit error payload.
    #[error("provider API error: {0}")]
    Api(String),

    /// The payload parsed as JSON but did not have the expected shape.
    #[error("failed to decode provider payload: {0}")]
    Decode(String),

    /// The requested time range cannot be represented.
    #[error("requested range for {symbol} is out of bounds")]
    InvalidRange { symbol: String },

    #[error("no API key configured for {provider} (set {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },
}

/// Errors surfaced by the trend pipeline.
#[derive(Debug, Error)]
pub enum TrendError {
    /// Nothing to score. Terminal for the symbol, never retried.
    #[error("data unavailable for {symbol}")]
    DataUnavailable { symbol: String },

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for TrendError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NoData { symbol } => Self::DataUnavailable { symbol },
            other => Self::Provider(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_maps_to_data_unavailable() {
        let err: TrendError = ProviderError::NoData {
            symbol: "GC=F".into(),
        }
        .into();
        assert!(matches!(err, TrendError::DataUnavailable { ref symbol } if symbol == "GC=F"));
        assert_eq!(err.to_string(), "data unavailable for GC=F");
    }

    #[test]
    fn api_error_stays_provider_error() {
        let err: TrendError = ProviderError::Api("invalid api key".into()).into();
        assert!(matches!(err, TrendError::Provider(ProviderError::Api(_))));
        assert_eq!(err.to_string(), "provider API error: invalid api key");
    }
}
