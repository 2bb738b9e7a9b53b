// =============================================================================
// Trend Scoring Engine — six-signal vote per bar
// =============================================================================
//
// Each bar receives one vote in {-1, 0, +1} from six independent conditions:
//
//   1. MA alignment      SMA_fast >  SMA_slow          | SMA_fast <  SMA_slow
//   2. Price vs fast MA  close    >  SMA_fast          | close    <  SMA_fast
//   3. Volume-confirmed  vol > vol_ma AND close > open | vol > vol_ma AND close < open
//   4. MACD momentum     MACD > signal AND MACD > 0    | MACD < signal AND MACD < 0
//   5. Fast-MA slope     SMA_fast(t) > SMA_fast(t-1)   | SMA_fast(t) < SMA_fast(t-1)
//   6. RSI bias          RSI > rsi_bullish             | RSI < rsi_bearish
//
// score = sum of the six votes, always in [-6, 6]. A signal whose inputs are
// undefined votes 0, as does the slope signal on the first bar. The engine is
// stateless: the same bars and frame always give the same scores.
// =============================================================================

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::market_data::Bar;
use crate::regime::{TrendLabel, TrendThresholds};

/// Number of signals, and so the magnitude of the largest possible score.
pub const SIGNAL_COUNT: usize = 6;

/// Votes of the six signals for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub ma_alignment: i8,
    pub price_vs_fast_ma: i8,
    pub volume_confirmed: i8,
    pub macd_momentum: i8,
    pub fast_ma_slope: i8,
    pub rsi_bias: i8,
}

impl SignalBreakdown {
    /// Votes in signal order (1 through 6).
    pub fn votes(&self) -> [i8; SIGNAL_COUNT] {
        [
            self.ma_alignment,
            self.price_vs_fast_ma,
            self.volume_confirmed,
            self.macd_momentum,
            self.fast_ma_slope,
            self.rsi_bias,
        ]
    }

    pub fn score(&self) -> i8 {
        self.votes().iter().sum()
    }
}

/// Engine output for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredBar {
    pub signals: SignalBreakdown,
    pub score: i8,
    pub label: TrendLabel,
}

/// Stateless scorer parameterised by its thresholds.
#[derive(Debug, Clone, Default)]
pub struct TrendEngine {
    thresholds: TrendThresholds,
}

impl TrendEngine {
    pub fn new(thresholds: TrendThresholds) -> Self {
        Self { thresholds }
    }

    /// Score every bar. The output always has one entry per bar; if `frame`
    /// is shorter than `bars` the missing rows count as fully undefined.
    pub fn score(&self, bars: &[Bar], frame: &IndicatorFrame) -> Vec<ScoredBar> {
        let rows = frame.rows();
        let undefined = IndicatorRow::default();

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let row = rows.get(i).unwrap_or(&undefined);
                let prev = i.checked_sub(1).and_then(|p| rows.get(p));
                let signals = self.evaluate(bar, row, prev);
                let score = signals.score();
                ScoredBar {
                    signals,
                    score,
                    label: self.thresholds.classify(score),
                }
            })
            .collect()
    }

    /// Votes of the six signals for a single bar.
    pub fn evaluate(
        &self,
        bar: &Bar,
        row: &IndicatorRow,
        prev: Option<&IndicatorRow>,
    ) -> SignalBreakdown {
        let t = &self.thresholds;

        let volume_confirmed = match row.volume_ma {
            Some(avg) if bar.volume > avg => vote(compare(Some(bar.close), Some(bar.open))),
            _ => 0,
        };

        let macd_momentum = match (row.macd, row.macd_signal) {
            (Some(m), Some(s)) => direction(m > s && m > 0.0, m < s && m < 0.0),
            _ => 0,
        };

        let fast_ma_slope = prev.map_or(0, |p| vote(compare(row.sma_fast, p.sma_fast)));

        let rsi_bias = row
            .rsi
            .map_or(0, |r| direction(r > t.rsi_bullish, r < t.rsi_bearish));

        SignalBreakdown {
            ma_alignment: vote(compare(row.sma_fast, row.sma_slow)),
            price_vs_fast_ma: vote(compare(Some(bar.close), row.sma_fast)),
            volume_confirmed,
            macd_momentum,
            fast_ma_slope,
            rsi_bias,
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Ordering of two defined values; `None` if either is undefined or NaN.
fn compare(a: Option<f64>, b: Option<f64>) -> Option<Ordering> {
    a?.partial_cmp(&b?)
}

fn vote(ordering: Option<Ordering>) -> i8 {
    match ordering {
        Some(Ordering::Greater) => 1,
        Some(Ordering::Less) => -1,
        _ => 0,
    }
}

fn direction(bullish: bool, bearish: bool) -> i8 {
    match (bullish, bearish) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorParams;
    use crate::market_data::bar::tests::bar_at;
    use crate::market_data::BarSeries;
    use crate::types::Interval;

    fn full_row() -> IndicatorRow {
        IndicatorRow {
            sma_fast: Some(100.0),
            sma_slow: Some(100.0),
            rsi: Some(47.0),
            macd: Some(0.0),
            macd_signal: Some(0.0),
            macd_hist: Some(0.0),
            volume_ma: Some(1_000.0),
        }
    }

    fn flat_bar() -> Bar {
        bar_at(0, 100.0)
    }

    fn series_from(closes: &[f64], volume: f64) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                open: c - 0.5,
                volume,
                ..bar_at(i as i64, c)
            })
            .collect();
        BarSeries::new("GC=F", Interval::Day1, bars)
    }

    fn run(series: &BarSeries) -> Vec<ScoredBar> {
        let frame = IndicatorFrame::compute(series, &IndicatorParams::default());
        TrendEngine::default().score(series.bars(), &frame)
    }

    // ---- individual signals ------------------------------------------------

    #[test]
    fn neutral_row_scores_zero() {
        let engine = TrendEngine::default();
        let s = engine.evaluate(&flat_bar(), &full_row(), Some(&full_row()));
        assert_eq!(s, SignalBreakdown::default());
    }

    #[test]
    fn ma_alignment_and_price_signals() {
        let engine = TrendEngine::default();
        let row = IndicatorRow {
            sma_fast: Some(101.0),
            sma_slow: Some(99.0),
            ..full_row()
        };
        let s = engine.evaluate(&flat_bar(), &row, None);
        assert_eq!(s.ma_alignment, 1);
        // close 100 < SMA_fast 101
        assert_eq!(s.price_vs_fast_ma, -1);
        assert_eq!(s.fast_ma_slope, 0);
    }

    #[test]
    fn volume_signal_needs_above_average_volume() {
        let engine = TrendEngine::default();
        let up = Bar {
            open: 99.0,
            volume: 1_500.0,
            ..flat_bar()
        };
        let down = Bar { open: 101.0, ..up };
        let quiet = Bar { volume: 1_000.0, ..up };
        let doji = Bar { open: 100.0, ..up };
        assert_eq!(engine.evaluate(&up, &full_row(), None).volume_confirmed, 1);
        assert_eq!(engine.evaluate(&down, &full_row(), None).volume_confirmed, -1);
        assert_eq!(engine.evaluate(&quiet, &full_row(), None).volume_confirmed, 0);
        assert_eq!(engine.evaluate(&doji, &full_row(), None).volume_confirmed, 0);
    }

    #[test]
    fn macd_signal_requires_matching_zero_side() {
        let engine = TrendEngine::default();
        let eval = |m: f64, s: f64| {
            let row = IndicatorRow {
                macd: Some(m),
                macd_signal: Some(s),
                ..full_row()
            };
            engine.evaluate(&flat_bar(), &row, None).macd_momentum
        };
        assert_eq!(eval(2.0, 1.0), 1);
        assert_eq!(eval(-1.0, -2.0), 0); // above signal but below zero
        assert_eq!(eval(-2.0, -1.0), -1);
        assert_eq!(eval(1.0, 2.0), 0); // below signal but above zero
    }

    #[test]
    fn slope_compares_with_previous_bar() {
        let engine = TrendEngine::default();
        let prev = IndicatorRow {
            sma_fast: Some(99.0),
            ..full_row()
        };
        assert_eq!(engine.evaluate(&flat_bar(), &full_row(), Some(&prev)).fast_ma_slope, 1);
        let prev = IndicatorRow {
            sma_fast: Some(101.0),
            ..full_row()
        };
        assert_eq!(engine.evaluate(&flat_bar(), &full_row(), Some(&prev)).fast_ma_slope, -1);
    }

    #[test]
    fn rsi_thresholds_are_asymmetric() {
        let engine = TrendEngine::default();
        let eval = |rsi: f64| {
            let row = IndicatorRow {
                rsi: Some(rsi),
                ..full_row()
            };
            engine.evaluate(&flat_bar(), &row, None).rsi_bias
        };
        assert_eq!(eval(50.5), 1);
        assert_eq!(eval(50.0), 0);
        assert_eq!(eval(45.0), 0);
        assert_eq!(eval(44.9), -1);
    }

    #[test]
    fn undefined_indicators_vote_zero() {
        let engine = TrendEngine::default();
        let bar = Bar {
            open: 90.0,
            volume: 5_000.0,
            ..flat_bar()
        };
        let s = engine.evaluate(&bar, &IndicatorRow::default(), Some(&IndicatorRow::default()));
        assert_eq!(s, SignalBreakdown::default());

        let nan_row = IndicatorRow {
            sma_fast: Some(f64::NAN),
            ..full_row()
        };
        let s = engine.evaluate(&flat_bar(), &nan_row, None);
        assert_eq!(s.ma_alignment, 0);
        assert_eq!(s.price_vs_fast_ma, 0);
    }

    #[test]
    fn short_frame_is_filled_with_neutral_scores() {
        let series = series_from(&[100.0, 101.0, 102.0], 1_000.0);
        let scored = TrendEngine::default().score(series.bars(), &IndicatorFrame::default());
        assert_eq!(scored.len(), 3);
        assert!(scored
            .iter()
            .all(|s| s.score == 0 && s.label == TrendLabel::Sideways));
    }

    // ---- whole-series properties ------------------------------------------

    #[test]
    fn scores_stay_in_bounds_and_match_labels() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 2000.0 + (i as f64 * 0.21).sin() * 40.0 + (i as f64 * 0.05).cos() * 15.0)
            .collect();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                open: c + if i % 3 == 0 { 1.0 } else { -1.0 },
                volume: 1_000.0 + (i % 7) as f64 * 150.0,
                ..bar_at(i as i64, c)
            })
            .collect();
        let series = BarSeries::new("GC=F", Interval::Day1, bars);

        let scored = run(&series);
        assert_eq!(scored.len(), series.len());
        for s in &scored {
            assert!((-6..=6).contains(&s.score));
            assert_eq!(s.score, s.signals.score());
            assert_eq!(s.label == TrendLabel::Uptrend, s.score >= 4);
            assert_eq!(s.label == TrendLabel::Downtrend, s.score <= -4);
            assert_eq!(s.label == TrendLabel::Sideways, s.score.abs() < 4);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let closes: Vec<f64> = (0..120).map(|i| 1900.0 + ((i * 37) % 23) as f64).collect();
        let series = series_from(&closes, 1_000.0);
        assert_eq!(run(&series), run(&series));
    }

    #[test]
    fn rising_series_is_an_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 2000.0 + i as f64).collect();
        let scored = run(&series_from(&closes, 1_000.0));

        for s in &scored[50..] {
            assert_eq!(s.signals.ma_alignment, 1);
            assert_eq!(s.signals.price_vs_fast_ma, 1);
            assert_eq!(s.signals.volume_confirmed, 0);
            assert_eq!(s.signals.macd_momentum, 1);
            assert_eq!(s.signals.fast_ma_slope, 1);
            assert_eq!(s.signals.rsi_bias, 1);
            assert!(s.score >= 4);
            assert_eq!(s.label, TrendLabel::Uptrend);
        }
    }

    #[test]
    fn falling_series_is_a_downtrend() {
        let closes: Vec<f64> = (0..60).map(|i| 2100.0 - i as f64).collect();
        let scored = run(&series_from(&closes, 1_000.0));
        let last = scored.last().unwrap();
        assert_eq!(last.score, -5);
        assert_eq!(last.label, TrendLabel::Downtrend);
    }

    #[test]
    fn flat_series_is_sideways() {
        let scored = run(&series_from(&vec![2000.0; 60], 1_000.0));
        for s in &scored {
            assert_eq!(s.score, 0);
            assert_eq!(s.label, TrendLabel::Sideways);
        }
    }

    #[test]
    fn flat_fractional_series_is_sideways() {
        // Every bar closes above its open; only a drifting volume average
        // could make the volume signal fire.
        let scored = run(&series_from(&vec![2341.7; 60], 1_234.56));
        for (i, s) in scored.iter().enumerate() {
            assert_eq!(s.signals, SignalBreakdown::default(), "bar {i}");
            assert_eq!(s.label, TrendLabel::Sideways);
        }
    }

    #[test]
    fn single_bar_has_no_slope_vote() {
        let scored = run(&series_from(&[2000.0], 1_000.0));
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].signals.fast_ma_slope, 0);
    }
}
