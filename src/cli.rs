// =============================================================================
// Command-line interface
// =============================================================================
//
// Flags override the config file, which overrides the built-in defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::types::Interval;

#[derive(Parser, Debug)]
#[command(author, version, about = "Six-signal trend scoring for gold and other instruments.")]
pub struct Cli {
    /// JSON config file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every bar and report the current trend.
    Trend {
        /// Symbol to analyse (repeatable, e.g. "GC=F").
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,

        /// Calendar days of history to fetch.
        #[arg(short, long)]
        days: Option<u32>,

        /// Bar interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk).
        #[arg(short, long)]
        interval: Option<Interval>,

        /// Rows of the score table to print.
        #[arg(long)]
        tail: Option<usize>,

        /// Write the full scored table as JSON.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Render a PNG chart (requires the `chart` feature).
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// RSI, Bollinger Bands, OBV and ATR on the latest bars.
    Snapshot {
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(short, long)]
        interval: Option<Interval>,

        /// Number of recent bars to fetch.
        #[arg(short, long)]
        bars: Option<u32>,
    },

    /// Volume profile and round-number key levels.
    Profile {
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(short, long)]
        days: Option<u32>,

        /// Interval to profile (repeatable).
        #[arg(short, long = "interval")]
        intervals: Vec<Interval>,

        /// Price bin width.
        #[arg(long)]
        bin: Option<f64>,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Destination (defaults to --config).
        path: Option<PathBuf>,
    },
}

impl Command {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        match self {
            Self::Trend {
                symbols,
                days,
                interval,
                tail,
                ..
            } => {
                let trend = &mut config.trend;
                if !symbols.is_empty() {
                    trend.symbols = symbols.clone();
                }
                if let Some(days) = days {
                    trend.lookback_days = *days;
                }
                if let Some(interval) = interval {
                    trend.interval = *interval;
                }
                if let Some(tail) = tail {
                    trend.tail_rows = *tail;
                }
            }
            Self::Snapshot {
                symbol,
                interval,
                bars,
            } => {
                let snap = &mut config.snapshot;
                if let Some(symbol) = symbol {
                    snap.symbol = symbol.clone();
                }
                if let Some(interval) = interval {
                    snap.interval = *interval;
                }
                if let Some(bars) = bars {
                    snap.bars = *bars;
                }
            }
            Self::Profile {
                symbol,
                days,
                intervals,
                bin,
            } => {
                let profile = &mut config.profile;
                if let Some(symbol) = symbol {
                    profile.symbol = symbol.clone();
                }
                if let Some(days) = days {
                    profile.lookback_days = *days;
                }
                if !intervals.is_empty() {
                    profile.intervals = intervals.clone();
                }
                if let Some(bin) = bin {
                    profile.price_bin = *bin;
                }
            }
            Self::InitConfig { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_flags_override_config() {
        let cli = Cli::try_parse_from([
            "aurum-trend",
            "trend",
            "-s",
            "GC=F",
            "--symbol",
            "XAUUSD=X",
            "--interval",
            "1h",
            "--days",
            "90",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = AppConfig::default();
        cli.command.apply(&mut config);
        assert_eq!(config.trend.symbols, vec!["GC=F", "XAUUSD=X"]);
        assert_eq!(config.trend.interval, Interval::Hour1);
        assert_eq!(config.trend.lookback_days, 90);
        assert_eq!(config.trend.tail_rows, 20);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::try_parse_from(["aurum-trend", "--config", "x.json", "snapshot"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));

        let mut config = AppConfig::default();
        cli.command.apply(&mut config);
        assert_eq!(config.snapshot.symbol, "GC=F");
        assert_eq!(config.snapshot.interval, Interval::Min30);
        assert_eq!(config.snapshot.bars, 100);
    }

    #[test]
    fn profile_accepts_repeated_intervals() {
        let cli = Cli::try_parse_from([
            "aurum-trend", "profile", "-i", "15min", "-i", "1d", "--bin", "5",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.command.apply(&mut config);
        assert_eq!(config.profile.intervals, vec![Interval::Min15, Interval::Day1]);
        assert_eq!(config.profile.price_bin, 5.0);
    }

    #[test]
    fn bad_interval_is_rejected() {
        assert!(Cli::try_parse_from(["aurum-trend", "trend", "-i", "7m"]).is_err());
    }
}
