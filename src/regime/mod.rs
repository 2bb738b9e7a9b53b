// =============================================================================
// Regime Module
// =============================================================================
//
// Classification of a bar's aggregated trend score into a market regime.

pub mod trend;

pub use trend::{TrendLabel, TrendThresholds};
