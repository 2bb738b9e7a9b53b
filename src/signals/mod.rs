// =============================================================================
// Signals Module
// =============================================================================
//
// Trend scoring: six directional votes per bar aggregated into one score,
// and the aligned output table handed to the presentation sinks.

pub mod table;
pub mod trend_score;

pub use table::{TrendRow, TrendTable};
