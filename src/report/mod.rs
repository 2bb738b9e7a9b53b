// =============================================================================
// Report Sinks
// =============================================================================
//
// Consumers of a finished `TrendTable`. Sinks only read the table; nothing
// flows back into the engine.

#[cfg(feature = "chart")]
pub mod chart;
pub mod console;
pub mod json;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::signals::TrendTable;

#[cfg(feature = "chart")]
pub use chart::ChartRenderer;
pub use console::ConsoleReport;
pub use json::JsonExport;

/// A presentation surface for scored series.
pub trait ReportSink {
    fn render(&mut self, table: &TrendTable) -> Result<()>;
}

/// `base` with the symbol folded into the file stem, for multi-symbol runs:
/// `trend.json` + `XAU/USD` => `trend_XAU_USD.json`.
pub fn per_symbol_path(base: &Path, symbol: &str) -> PathBuf {
    let tag: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{tag}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{tag}"),
    };
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_folded_into_the_stem() {
        assert_eq!(
            per_symbol_path(Path::new("out/trend.json"), "XAU/USD"),
            PathBuf::from("out/trend_XAU_USD.json")
        );
        assert_eq!(
            per_symbol_path(Path::new("chart"), "GC=F"),
            PathBuf::from("chart_GC_F")
        );
    }
}
