// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR):
//   TR_0 = H_0 - L_0                                   (no previous close)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
//   ATR_{period-1} = mean(TR_0 ..= TR_{period-1})
//   ATR_t          = (ATR_{t-1} * (period - 1) + TR_t) / period
// =============================================================================

use crate::market_data::Bar;

/// Most recent Wilder ATR over `bars` (oldest first).
///
/// `None` when `period == 0`, there are fewer than `period` bars, or any
/// price involved is non-finite.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let true_ranges = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| true_range(bar, i.checked_sub(1).map(|p| bars[p].close)))
        .collect::<Option<Vec<f64>>>()?;

    let period_f = period as f64;
    let mut atr = true_ranges[..period].iter().sum::<f64>() / period_f;
    for &tr in &true_ranges[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
    }

    atr.is_finite().then_some(atr)
}

fn true_range(bar: &Bar, prev_close: Option<f64>) -> Option<f64> {
    if !(bar.high.is_finite() && bar.low.is_finite()) {
        return None;
    }
    let hl = bar.high - bar.low;
    match prev_close {
        None => Some(hl),
        Some(pc) if pc.is_finite() => {
            let hc = (bar.high - pc).abs();
            let lc = (bar.low - pc).abs();
            Some(hl.max(hc).max(lc))
        }
        Some(_) => None,
    }
}
