// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd      = EMA(fast) - EMA(slow)
//   signal    = EMA(macd, signal)
//   histogram = macd - signal
//
// All three EMAs are seeded with their first input, so every bar has a value
// and the first bar is always (0, 0, 0).

use crate::indicators::ema::exponential_moving_average;

/// Aligned MACD output, one entry per input close in each vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD over `closes`. Any zero window produces empty vectors.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = exponential_moving_average(closes, fast);
    let slow_ema = exponential_moving_average(closes, slow);
    if fast_ema.is_empty() || slow_ema.is_empty() || signal == 0 {
        return MacdSeries::default();
    }

    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = exponential_moving_average(&macd, signal);
    let histogram = macd.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
