// =============================================================================
// Console report
// =============================================================================
//
// Plain-text rendering of the trend table, the technical snapshot and the
// volume profile. Reports go to the wrapped writer (stdout in the CLI);
// diagnostics go through tracing.

use std::io::Write;

use anyhow::Result;

use crate::indicators::rsi::RsiZone;
use crate::pipeline::{ProfileReport, Snapshot};
use crate::regime::TrendLabel;
use crate::report::ReportSink;
use crate::signals::{TrendRow, TrendTable};

const RULE_WIDTH: usize = 60;
/// Width of the text bar drawn for the busiest profile bin.
const PROFILE_BAR_WIDTH: usize = 40;

pub struct ConsoleReport<W: Write> {
    out: W,
    tail_rows: usize,
    volume_window: usize,
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W, tail_rows: usize, volume_window: usize) -> Self {
        Self {
            out,
            tail_rows,
            volume_window,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Technical snapshot of the latest bar.
    pub fn snapshot(&mut self, snap: &Snapshot) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "{} ({}) - TECHNICAL SNAPSHOT", snap.symbol, snap.interval)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Time:      {}", snap.timestamp.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(out, "Price:     {:.2}", snap.close)?;

        match snap.rsi {
            Some(rsi) => writeln!(out, "RSI:       {:.2} ({})", rsi, RsiZone::of(rsi))?,
            None => writeln!(out, "RSI:       n/a")?,
        }
        match snap.bollinger {
            Some(b) => {
                writeln!(
                    out,
                    "Bollinger: lower {:.2} | close {:.2} | upper {:.2}",
                    b.lower, snap.close, b.upper
                )?;
                let pct_b = fmt_opt(b.percent_b(snap.close), 2);
                writeln!(out, "           width {:.2}% | %B {pct_b}", b.width)?;
            }
            None => writeln!(out, "Bollinger: n/a")?,
        }
        writeln!(out, "OBV:       {}", fmt_opt(snap.obv, 0))?;
        writeln!(out, "ATR:       {}", fmt_opt(snap.atr, 2))?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }

    /// Volume profile, one block per interval, then the key levels over the
    /// combined range.
    pub fn profile(&mut self, report: &ProfileReport) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "{} - VOLUME PROFILE", report.symbol)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

        for (interval, result) in &report.intervals {
            writeln!(out, "\n[{interval}]")?;
            let p = match result {
                Ok(p) => p,
                Err(e) => {
                    writeln!(out, "  {e}")?;
                    continue;
                }
            };

            writeln!(
                out,
                "  bars: {}  range: {:.2} - {:.2}  volume: {:.0}",
                p.bars,
                p.low,
                p.high,
                p.profile.total_volume()
            )?;
            for bin in p.profile.bins.iter().rev() {
                let width = (bin.normalized * PROFILE_BAR_WIDTH as f64).round() as usize;
                writeln!(
                    out,
                    "  {:>10.2} {:>14.0} {}",
                    bin.price,
                    bin.volume,
                    "#".repeat(width)
                )?;
            }
            if let Some(poc) = p.profile.point_of_control() {
                writeln!(out, "  point of control: {:.2} ({:.0})", poc.price, poc.volume)?;
            }
        }

        if let Some((low, high)) = report.range {
            writeln!(out, "\n[all intervals]")?;
            writeln!(out, "  range: {low:.2} - {high:.2}")?;
            for (step, levels) in &report.key_levels {
                let levels: Vec<String> = levels.iter().map(|l| format!("{l:.0}")).collect();
                writeln!(out, "  key levels /{step}: {}", levels.join(", "))?;
            }
        }
        Ok(())
    }

    fn write_tail(&mut self, table: &TrendTable) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "{:<17} {:>10} {:>6}  {}", "time", "close", "score", "trend")?;
        for row in table.tail(self.tail_rows) {
            writeln!(
                out,
                "{:<17} {:>10.2} {:>6}  {}",
                row.timestamp.format("%Y-%m-%d %H:%M"),
                row.close,
                row.trend_score,
                row.trend_label
            )?;
        }
        Ok(())
    }

    fn write_analysis(&mut self, table: &TrendTable, latest: &TrendRow) -> Result<()> {
        let out = &mut self.out;
        let score = latest.trend_score;

        writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            out,
            "{} ({}) - CURRENT TREND ANALYSIS",
            table.symbol(),
            table.interval()
        )?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

        match latest.trend_label {
            TrendLabel::Uptrend => {
                writeln!(out, "\nSTRONG UPTREND CONFIRMED (Score: {}/6)", score.abs())?
            }
            TrendLabel::Downtrend => {
                writeln!(out, "\nSTRONG DOWNTREND CONFIRMED (Score: {}/6)", score.abs())?
            }
            TrendLabel::Sideways => {
                writeln!(out, "\nSIDEWAYS MARKET (Score: {score}/6)")?;
                let lean = match score {
                    s if s > 0 => "Leaning slightly bullish",
                    s if s < 0 => "Leaning slightly bearish",
                    _ => "Completely neutral",
                };
                writeln!(out, "   {lean}")?;
            }
        }

        let ind = &latest.indicators;
        let close = latest.close;
        writeln!(out, "\nTECHNICAL INDICATORS:")?;
        writeln!(out, "- Price: ${close:.2}")?;
        for (name, value) in [("SMA fast", ind.sma_fast), ("SMA slow", ind.sma_slow)] {
            match value {
                Some(v) => writeln!(out, "- {name}: ${v:.2} ({} price)", above_below(close > v))?,
                None => writeln!(out, "- {name}: n/a")?,
            }
        }
        match ind.rsi {
            Some(rsi) => writeln!(out, "- RSI: {rsi:.2} ({})", RsiZone::of(rsi))?,
            None => writeln!(out, "- RSI: n/a")?,
        }
        match ind.volume_ma {
            Some(avg) => writeln!(
                out,
                "- Volume: {:.2}M ({} {}-bar avg)",
                latest.volume / 1_000_000.0,
                above_below(latest.volume > avg),
                self.volume_window
            )?,
            None => writeln!(out, "- Volume: {:.2}M", latest.volume / 1_000_000.0)?,
        }
        match (ind.macd, ind.macd_signal) {
            (Some(m), Some(s)) => {
                writeln!(out, "- MACD: {m:.4} ({} signal line)", above_below(m > s))?
            }
            _ => writeln!(out, "- MACD: n/a")?,
        }
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn render(&mut self, table: &TrendTable) -> Result<()> {
        self.write_tail(table)?;
        if let Some(latest) = table.latest() {
            self.write_analysis(table, latest)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn above_below(above: bool) -> &'static str {
    if above {
        "above"
    } else {
        "below"
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"))
}
