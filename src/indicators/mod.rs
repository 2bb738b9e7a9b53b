// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the trend
// engine and the snapshot / profile reports. Series functions take slices
// (oldest first) and return one value per input; latest-value functions return
// `Option<T>` so callers must handle insufficient data.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod frame;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod volume_profile;

pub use frame::{IndicatorFrame, IndicatorRow};
