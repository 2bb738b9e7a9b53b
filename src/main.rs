// =============================================================================
// Aurum Trend — Main Entry Point
// =============================================================================
//
// Fetch bars, score them, report. Every symbol and interval runs
// independently; a symbol without data is reported and skipped.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod cli;
mod config;
mod error;
mod indicators;
mod market_data;
mod pipeline;
mod regime;
mod report;
mod signals;
mod types;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::error::TrendError;
use crate::market_data::{BarRequest, MarketDataClient};
use crate::report::{per_symbol_path, ConsoleReport, JsonExport, ReportSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        let path = path.as_ref().unwrap_or(&cli.config);
        AppConfig::default().save(path)?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    // ── 2. Config: defaults < file < environment < flags ────────────────
    let mut config = AppConfig::load_or_default(&cli.config);
    config.apply_env();
    cli.command.apply(&mut config);
    config.validate()?;

    // ── 3. Provider ─────────────────────────────────────────────────────
    let client = MarketDataClient::from_config(&config.provider)
        .context("failed to build market data client")?;
    info!(provider = %config.provider.kind, "market data client ready");

    // ── 4. Run ──────────────────────────────────────────────────────────
    match cli.command {
        Command::Trend { export, chart, .. } => run_trend(&client, &config, export, chart).await,
        Command::Snapshot { .. } => run_snapshot(&client, &config).await,
        Command::Profile { .. } => run_profile(&client, &config).await,
        Command::InitConfig { .. } => Ok(()),
    }
}

async fn run_trend(
    client: &MarketDataClient,
    config: &AppConfig,
    export: Option<PathBuf>,
    chart: Option<PathBuf>,
) -> anyhow::Result<()> {
    let trend = &config.trend;
    info!(
        symbols = ?trend.symbols,
        interval = %trend.interval,
        days = trend.lookback_days,
        "trend analysis starting"
    );

    #[cfg(not(feature = "chart"))]
    if chart.is_some() {
        bail!("--chart requires a build with the `chart` feature");
    }

    let requests: Vec<BarRequest> = trend
        .symbols
        .iter()
        .map(|s| BarRequest::lookback_days(s.as_str(), trend.interval, trend.lookback_days))
        .collect::<Result<_, _>>()?;
    let results =
        pipeline::analyze_many(client, &requests, &config.indicators, &config.thresholds).await;

    let multi = requests.len() > 1;
    let target = |base: &PathBuf, symbol: &str| {
        if multi {
            per_symbol_path(base, symbol)
        } else {
            base.clone()
        }
    };

    let mut console = ConsoleReport::new(
        std::io::stdout().lock(),
        trend.tail_rows,
        config.indicators.volume_ma,
    );
    let mut scored = 0usize;

    for (request, result) in requests.iter().zip(results) {
        let table = match result {
            Ok(table) => table,
            Err(e) => {
                report_failure(&request.symbol, &e);
                continue;
            }
        };
        scored += 1;

        console.render(&table)?;

        if let Some(base) = &export {
            JsonExport::new(target(base, table.symbol())).render(&table)?;
        }

        #[cfg(feature = "chart")]
        if let Some(base) = &chart {
            report::ChartRenderer::new(target(base, table.symbol()), config.thresholds)
                .render(&table)?;
        }
    }

    if scored == 0 {
        bail!("no symbol could be analysed");
    }
    Ok(())
}

async fn run_snapshot(client: &MarketDataClient, config: &AppConfig) -> anyhow::Result<()> {
    match pipeline::fetch_snapshot(client, &config.snapshot).await {
        Ok(snap) => ConsoleReport::new(std::io::stdout().lock(), 0, 0).snapshot(&snap),
        Err(e) => {
            report_failure(&config.snapshot.symbol, &e);
            bail!("snapshot failed for {}", config.snapshot.symbol)
        }
    }
}

async fn run_profile(client: &MarketDataClient, config: &AppConfig) -> anyhow::Result<()> {
    let params = &config.profile;
    let report = pipeline::fetch_profiles(client, params).await;

    for (interval, result) in &report.intervals {
        if let Err(e) = result {
            warn!(symbol = %params.symbol, interval = %interval, error = %e, "profile unavailable");
        }
    }

    ConsoleReport::new(std::io::stdout().lock(), 0, 0).profile(&report)?;

    if !report.has_data() {
        bail!("no interval could be profiled for {}", params.symbol);
    }
    Ok(())
}

/// Missing data is a terminal, per-symbol message; anything else is logged
/// as an error.
fn report_failure(symbol: &str, err: &TrendError) {
    match err {
        TrendError::DataUnavailable { .. } => {
            println!("[x] Data unavailable for {symbol}");
            warn!(symbol, "no data returned, skipping");
        }
        TrendError::Provider(e) => {
            error!(symbol, error = %e, "failed to fetch bars");
        }
    }
}
