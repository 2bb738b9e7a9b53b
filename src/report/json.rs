// =============================================================================
// JSON export
// =============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::report::ReportSink;
use crate::signals::TrendTable;

/// Writes the full table as pretty JSON, atomically (write `.tmp`, then rename).
#[derive(Debug, Clone)]
pub struct JsonExport {
    path: PathBuf,
}

impl JsonExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonExport {
    fn render(&mut self, table: &TrendTable) -> Result<()> {
        let content =
            serde_json::to_string_pretty(table).context("failed to serialise trend table")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp export to {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            symbol = table.symbol(),
            rows = table.rows().len(),
            "trend table exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorParams;
    use crate::market_data::bar::tests::bar_at;
    use crate::market_data::BarSeries;
    use crate::regime::TrendThresholds;
    use crate::types::Interval;

    #[test]
    fn export_writes_every_row() {
        let bars = (0..25).map(|i| bar_at(i, 1900.0 + i as f64)).collect();
        let series = BarSeries::new("GC=F", Interval::Day1, bars);
        let table = TrendTable::score(
            &series,
            &IndicatorParams::default(),
            &TrendThresholds::default(),
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("aurum_export_{}.json", std::process::id()));
        JsonExport::new(&path).render(&table).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["symbol"], "GC=F");
        assert_eq!(value["interval"], "1d");
        assert_eq!(value["rows"].as_array().unwrap().len(), 25);
        assert!(!path.with_extension("json.tmp").exists());

        let _ = std::fs::remove_file(&path);
    }
}
