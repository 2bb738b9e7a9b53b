pub mod bar;
pub mod provider;
pub mod twelvedata;
pub mod yahoo;

pub use bar::{Bar, BarSeries};
pub use provider::{BarProvider, BarRequest, MarketDataClient};
