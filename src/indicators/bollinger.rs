// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(period), upper/lower = middle ± k·σ with the population
// standard deviation of the same window. Width is the normalised distance
// (upper - lower) / middle * 100.
//
// Only the latest window is evaluated; the snapshot report needs no history.

/// Bands for the most recent `period` closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

impl BollingerBands {
    /// Where `price` sits inside the bands: 0 at the lower band, 1 at the
    /// upper band. `None` when the bands have collapsed to a line.
    pub fn percent_b(&self, price: f64) -> Option<f64> {
        let span = self.upper - self.lower;
        (span > 0.0).then(|| (price - self.lower) / span)
    }
}

/// Bollinger Bands over the last `period` closes.
///
/// Returns `None` when there are fewer than `period` closes, `period == 0`,
/// the middle band is zero or any value is non-finite.
pub fn bollinger_bands(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    if middle == 0.0 {
        return None;
    }

    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let bands = BollingerBands {
        upper: middle + num_std * std_dev,
        middle,
        lower: middle - num_std * std_dev,
        width: 2.0 * num_std * std_dev / middle * 100.0,
    };

    bands.width.is_finite().then_some(bands)
}
