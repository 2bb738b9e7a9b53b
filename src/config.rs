// =============================================================================
// Configuration — JSON settings file with env-injected credentials
// =============================================================================
//
// Every tunable parameter of the tool lives here: provider selection, the
// indicator periods, the trend thresholds and the defaults of each command.
// All fields carry `#[serde(default)]` so a partial (or empty) file loads, and
// CLI flags override what the file says.
//
// Credentials never live in the file. They are read from the environment
// (optionally populated from `.env` via dotenv) by `AppConfig::apply_env`.
//
// Persistence uses an atomic tmp + rename pattern.
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::regime::TrendThresholds;
use crate::types::{Interval, ProviderKind};

/// Environment variable holding the Twelve Data API key.
pub const TWELVEDATA_API_KEY_ENV: &str = "TWELVEDATA_API_KEY";

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "aurum_config.json";

/// Longest history any command may request.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// Most bars a snapshot may request (the Twelve Data per-call cap).
pub const MAX_SNAPSHOT_BARS: u32 = 5_000;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_twelvedata_base_url() -> String {
    "https://api.twelvedata.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_gold_symbol() -> String {
    "GC=F".to_string()
}

fn default_trend_symbols() -> Vec<String> {
    vec![default_gold_symbol()]
}

fn default_trend_lookback_days() -> u32 {
    365
}

fn default_tail_rows() -> usize {
    20
}

fn default_snapshot_interval() -> Interval {
    Interval::Min30
}

fn default_snapshot_bars() -> u32 {
    100
}

fn default_fourteen() -> usize {
    14
}

fn default_bollinger_period() -> usize {
    21
}

fn default_bollinger_std() -> f64 {
    2.0
}

fn default_profile_lookback_days() -> u32 {
    7
}

fn default_profile_intervals() -> Vec<Interval> {
    vec![Interval::Min15, Interval::Day1]
}

fn default_price_bin() -> f64 {
    2.0
}

fn default_key_level_steps() -> Vec<f64> {
    vec![25.0, 50.0]
}

// =============================================================================
// Sections
// =============================================================================

/// Which market-data service to use and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    #[serde(default = "default_twelvedata_base_url")]
    pub twelvedata_base_url: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Injected from the environment, never serialised.
    #[serde(skip)]
    pub twelvedata_api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            yahoo_base_url: default_yahoo_base_url(),
            twelvedata_base_url: default_twelvedata_base_url(),
            timeout_secs: default_timeout_secs(),
            twelvedata_api_key: None,
        }
    }
}

/// Look-back periods of the trend indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_ma: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_fast: 21,
            sma_slow: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_ma: 20,
        }
    }
}

/// Defaults of the `trend` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSettings {
    #[serde(default = "default_trend_symbols")]
    pub symbols: Vec<String>,

    #[serde(default)]
    pub interval: Interval,

    #[serde(default = "default_trend_lookback_days")]
    pub lookback_days: u32,

    /// Rows of the score table printed before the summary.
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            symbols: default_trend_symbols(),
            interval: Interval::default(),
            lookback_days: default_trend_lookback_days(),
            tail_rows: default_tail_rows(),
        }
    }
}

/// Defaults of the `snapshot` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotParams {
    #[serde(default = "default_gold_symbol")]
    pub symbol: String,

    #[serde(default = "default_snapshot_interval")]
    pub interval: Interval,

    #[serde(default = "default_snapshot_bars")]
    pub bars: u32,

    #[serde(default = "default_fourteen")]
    pub rsi_period: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,

    #[serde(default = "default_fourteen")]
    pub atr_period: usize,
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            symbol: default_gold_symbol(),
            interval: default_snapshot_interval(),
            bars: default_snapshot_bars(),
            rsi_period: default_fourteen(),
            bollinger_period: default_bollinger_period(),
            bollinger_std: default_bollinger_std(),
            atr_period: default_fourteen(),
        }
    }
}

/// Defaults of the `profile` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileParams {
    #[serde(default = "default_gold_symbol")]
    pub symbol: String,

    #[serde(default = "default_profile_lookback_days")]
    pub lookback_days: u32,

    #[serde(default = "default_profile_intervals")]
    pub intervals: Vec<Interval>,

    /// Width of one volume-profile price bin.
    #[serde(default = "default_price_bin")]
    pub price_bin: f64,

    /// Round-number grids drawn as key levels.
    #[serde(default = "default_key_level_steps")]
    pub key_level_steps: Vec<f64>,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            symbol: default_gold_symbol(),
            lookback_days: default_profile_lookback_days(),
            intervals: default_profile_intervals(),
            price_bin: default_price_bin(),
            key_level_steps: default_key_level_steps(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub trend: TrendSettings,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub thresholds: TrendThresholds,

    #[serde(default)]
    pub snapshot: SnapshotParams,

    #[serde(default)]
    pub profile: ProfileParams,
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            provider = %config.provider.kind,
            symbols = ?config.trend.symbols,
            "config loaded"
        );

        Ok(config)
    }

    /// Load `path`, falling back to defaults (with a warning) when the file
    /// is missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }

    /// Pull credentials from the process environment.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(TWELVEDATA_API_KEY_ENV) {
            self.provider.twelvedata_api_key = Some(key);
        }
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let p = &self.indicators;
        let periods = [
            ("sma_fast", p.sma_fast),
            ("sma_slow", p.sma_slow),
            ("rsi_period", p.rsi_period),
            ("macd_fast", p.macd_fast),
            ("macd_slow", p.macd_slow),
            ("macd_signal", p.macd_signal),
            ("volume_ma", p.volume_ma),
            ("snapshot.rsi_period", self.snapshot.rsi_period),
            ("snapshot.bollinger_period", self.snapshot.bollinger_period),
            ("snapshot.atr_period", self.snapshot.atr_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, v)| *v == 0) {
            bail!("invalid config: {name} must be > 0");
        }

        let ranges = [
            ("trend.lookback_days", self.trend.lookback_days, MAX_LOOKBACK_DAYS),
            ("profile.lookback_days", self.profile.lookback_days, MAX_LOOKBACK_DAYS),
            ("snapshot.bars", self.snapshot.bars, MAX_SNAPSHOT_BARS),
        ];
        for (name, value, max) in ranges {
            if value == 0 || value > max {
                bail!("invalid config: {name} must be in 1..={max}, got {value}");
            }
        }

        self.thresholds.validate()?;

        if !(self.profile.price_bin.is_finite() && self.profile.price_bin > 0.0) {
            bail!(
                "invalid config: profile.price_bin must be a positive number, got {}",
                self.profile.price_bin
            );
        }
        if self.profile.key_level_steps.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            bail!("invalid config: profile.key_level_steps must all be positive");
        }
        if self.provider.timeout_secs == 0 {
            bail!("invalid config: provider.timeout_secs must be > 0");
        }
        Ok(())
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved");
        Ok(())
    }
}
