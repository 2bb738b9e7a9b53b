// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// Two flavours are provided:
//
// * `relative_strength_index` — rolling-mean RSI used by the trend frame.
//   Gains and losses are averaged with the same shrink window as the SMA, so
//   every bar has a value. The first bar has no predecessor and contributes a
//   zero gain and a zero loss.
//
// * `wilder_rsi` — Wilder smoothing used by the technical snapshot, i.e. an
//   exponential average with alpha = 1 / period seeded by the first move:
//     avg_1 = x_1
//     avg_t = (avg_{t-1} * (period - 1) + x_t) / period
//   A value is emitted once `period` moves have been seen.
//
// Both share the zero-division policy:
//   avg_loss == 0 && avg_gain == 0  => 50  (no movement, neutral)
//   avg_loss == 0 && avg_gain  > 0  => 100
//   otherwise RSI = 100 - 100 / (1 + avg_gain / avg_loss)
// =============================================================================

use crate::indicators::sma::simple_moving_average;

/// Level above which a reading is reported as overbought.
pub const OVERBOUGHT: f64 = 70.0;
/// Level below which a reading is reported as oversold.
pub const OVERSOLD: f64 = 30.0;

/// Human-readable zone of an RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn of(rsi: f64) -> Self {
        if rsi > OVERBOUGHT {
            Self::Overbought
        } else if rsi < OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "overbought"),
            Self::Oversold => write!(f, "oversold"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Rolling-mean RSI, one value per close.
///
/// Returns an empty `Vec` when `window == 0`. A bar whose averages are not
/// finite (NaN in the input) yields `NaN`, which callers treat as undefined.
pub fn relative_strength_index(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || closes.is_empty() {
        return Vec::new();
    }

    let (gains, losses) = split_moves(closes);
    let avg_gain = simple_moving_average(&gains, window);
    let avg_loss = simple_moving_average(&losses, window);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| rsi_from_averages(g, l).unwrap_or(f64::NAN))
        .collect()
}

/// Wilder-smoothed RSI series.
///
/// The returned vector has one value for each close starting at index
/// `period`. Empty when `period == 0` or there are fewer than `period + 1`
/// closes. Production stops at the first non-finite value.
pub fn wilder_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let (gains, losses) = split_moves(closes);
    // Index 0 is the synthetic zero move; real deltas start at 1.
    let gains = &gains[1..];
    let losses = &losses[1..];

    let period_f = period as f64;
    let mut avg_gain = gains[0];
    let mut avg_loss = losses[0];

    let mut result = Vec::with_capacity(gains.len() + 1 - period);
    for (i, (&gain, &loss)) in gains.iter().zip(losses).enumerate() {
        if i > 0 {
            avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
            avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
        }
        if i + 1 < period {
            continue;
        }

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break,
        }
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Per-bar gains and losses (both non-negative). Index 0 is always (0, 0).
fn split_moves(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);

    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }
    (gains, losses)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- relative_strength_index -----------------------------------------

    #[test]
    fn rolling_rsi_one_value_per_close() {
        let closes: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        assert_eq!(relative_strength_index(&closes, 14).len(), 5);
        assert!(relative_strength_index(&closes, 0).is_empty());
        assert!(relative_strength_index(&[], 14).is_empty());
    }

    #[test]
    fn rolling_rsi_gains_only_is_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let rsi = relative_strength_index(&closes, 14);
        // Bar 0 has no move at all; every later bar has gains and no losses.
        assert_eq!(rsi[0], 50.0);
        assert!(rsi[1..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rolling_rsi_flat_is_50() {
        let rsi = relative_strength_index(&vec![2000.0; 30], 14);
        assert!(rsi.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rolling_rsi_losses_only_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = relative_strength_index(&closes, 14);
        assert!(rsi[1..].iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn rolling_rsi_known_value() {
        // Moves: +2, -1 over a window of 3 (including the synthetic zero):
        // avg_gain = 2/3, avg_loss = 1/3 => RS = 2 => RSI = 66.67
        let rsi = relative_strength_index(&[10.0, 12.0, 11.0], 3);
        assert!((rsi[2] - 200.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn rolling_rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for &v in &relative_strength_index(&closes, 14) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    // ---- wilder_rsi --------------------------------------------------------

    #[test]
    fn wilder_insufficient_data() {
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(wilder_rsi(&closes, 14).is_empty());
        assert!(wilder_rsi(&closes, 0).is_empty());
    }

    #[test]
    fn wilder_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = wilder_rsi(&closes, 14);
        assert_eq!(series.len(), 30 - 14);
        assert!(series.iter().all(|&v| (v - 100.0).abs() < 1e-10));
    }

    #[test]
    fn wilder_flat_market() {
        let series = wilder_rsi(&vec![100.0; 30], 14);
        assert!(!series.is_empty());
        assert!(series.iter().all(|&v| (v - 50.0).abs() < 1e-10));
    }

    #[test]
    fn wilder_seeds_with_first_move() {
        // Moves +2, -1, +2 with period 2:
        //   seed (2, 0); then (1, 0.5) => RS 2; then (1.5, 0.25) => RS 6.
        let series = wilder_rsi(&[10.0, 12.0, 11.0, 13.0], 2);
        assert_eq!(series.len(), 2);
        assert!((series[0] - 200.0 / 3.0).abs() < 1e-10);
        assert!((series[1] - 600.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn wilder_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = wilder_rsi(&closes, 14);
        assert_eq!(series.len(), 4);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    // ---- zones -------------------------------------------------------------

    #[test]
    fn zone_boundaries_are_strict() {
        assert_eq!(RsiZone::of(70.0), RsiZone::Neutral);
        assert_eq!(RsiZone::of(70.1), RsiZone::Overbought);
        assert_eq!(RsiZone::of(30.0), RsiZone::Neutral);
        assert_eq!(RsiZone::of(29.9), RsiZone::Oversold);
        assert_eq!(RsiZone::Overbought.to_string(), "overbought");
    }
}
