// =============================================================================
// Volume Profile & Key Price Levels
// =============================================================================
//
// Each bar's volume is attributed to the price bin containing its close:
//   bin = floor(close / price_bin) * price_bin
// Bins are reported ascending by price, each normalised by the largest bin so
// the busiest level reads 1.0. The point of control is that busiest bin.
//
// Key levels are the round-number grid (every 25 / 50 by default) spanning
// the traded range, used as horizontal reference lines.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::market_data::Bar;

/// Volume traded with closes inside one price bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBin {
    /// Lower edge of the bin.
    pub price: f64,
    pub volume: f64,
    /// `volume` divided by the largest bin volume, in [0, 1].
    pub normalized: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProfile {
    pub price_bin: f64,
    pub bins: Vec<VolumeBin>,
}

impl VolumeProfile {
    /// Bin with the most volume (the lowest such price on ties).
    pub fn point_of_control(&self) -> Option<&VolumeBin> {
        self.bins
            .iter()
            .fold(None, |best: Option<&VolumeBin>, bin| match best {
                Some(b) if b.volume >= bin.volume => Some(b),
                _ => Some(bin),
            })
    }

    pub fn total_volume(&self) -> f64 {
        self.bins.iter().map(|b| b.volume).sum()
    }
}

/// Build the volume profile of `bars` with bins `price_bin` wide.
///
/// Bars with a non-finite close or volume are skipped. Returns an empty
/// profile when `price_bin` is not a positive finite number.
pub fn volume_profile(bars: &[Bar], price_bin: f64) -> VolumeProfile {
    if !(price_bin.is_finite() && price_bin > 0.0) {
        return VolumeProfile {
            price_bin,
            bins: Vec::new(),
        };
    }

    // Keyed by bin index so ordering and grouping never compare floats.
    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for bar in bars {
        if !(bar.close.is_finite() && bar.volume.is_finite()) {
            continue;
        }
        let index = (bar.close / price_bin).floor() as i64;
        *totals.entry(index).or_insert(0.0) += bar.volume;
    }

    let max_volume = totals.values().copied().fold(0.0_f64, f64::max);
    let bins = totals
        .into_iter()
        .map(|(index, volume)| VolumeBin {
            price: index as f64 * price_bin,
            volume,
            normalized: if max_volume > 0.0 { volume / max_volume } else { 0.0 },
        })
        .collect();

    VolumeProfile { price_bin, bins }
}

/// Every multiple of `step` from `floor(low / step) * step` up to and
/// including `ceil(high / step) * step`.
pub fn key_levels(low: f64, high: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0 && low.is_finite() && high.is_finite()) || low > high {
        return Vec::new();
    }

    let first = (low / step).floor() as i64;
    let last = (high / step).ceil() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Lowest low and highest high across `bars`, ignoring non-finite values.
pub fn price_range(bars: &[Bar]) -> Option<(f64, f64)> {
    let lows = bars.iter().map(|b| b.low).filter(|v| v.is_finite());
    let highs = bars.iter().map(|b| b.high).filter(|v| v.is_finite());
    let low = lows.fold(f64::INFINITY, f64::min);
    let high = highs.fold(f64::NEG_INFINITY, f64::max);
    (low.is_finite() && high.is_finite()).then_some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::tests::bar_at;

    fn bar(close: f64, volume: f64) -> Bar {
        Bar {
            volume,
            ..bar_at(0, close)
        }
    }

    #[test]
    fn bins_group_and_normalise() {
        let bars = [
            bar(2001.0, 100.0),
            bar(2001.9, 50.0),
            bar(2003.5, 300.0),
            bar(1999.99, 30.0),
        ];
        let vp = volume_profile(&bars, 2.0);
        let prices: Vec<f64> = vp.bins.iter().map(|b| b.price).collect();
        assert_eq!(prices, vec![1998.0, 2000.0, 2002.0]);
        let volumes: Vec<f64> = vp.bins.iter().map(|b| b.volume).collect();
        assert_eq!(volumes, vec![30.0, 150.0, 300.0]);
        assert_eq!(vp.bins[2].normalized, 1.0);
        assert!((vp.bins[1].normalized - 0.5).abs() < 1e-12);
        assert_eq!(vp.total_volume(), 480.0);
    }

    #[test]
    fn point_of_control_is_busiest_bin() {
        let bars = [bar(10.0, 5.0), bar(12.0, 9.0), bar(14.0, 9.0)];
        let vp = volume_profile(&bars, 2.0);
        let poc = vp.point_of_control().unwrap();
        assert_eq!(poc.price, 12.0);
    }

    #[test]
    fn zero_volume_profile_normalises_to_zero() {
        let vp = volume_profile(&[bar(10.0, 0.0)], 2.0);
        assert_eq!(vp.bins.len(), 1);
        assert_eq!(vp.bins[0].normalized, 0.0);
    }

    #[test]
    fn invalid_bin_width_is_empty() {
        assert!(volume_profile(&[bar(10.0, 1.0)], 0.0).bins.is_empty());
        assert!(volume_profile(&[bar(10.0, 1.0)], f64::NAN).bins.is_empty());
        assert!(volume_profile(&[], 2.0).point_of_control().is_none());
    }

    #[test]
    fn key_levels_span_the_range_inclusive() {
        assert_eq!(
            key_levels(2312.0, 2368.0, 25.0),
            vec![2300.0, 2325.0, 2350.0, 2375.0]
        );
        assert_eq!(key_levels(2300.0, 2350.0, 50.0), vec![2300.0, 2350.0]);
        assert!(key_levels(10.0, 5.0, 25.0).is_empty());
        assert!(key_levels(1.0, 5.0, 0.0).is_empty());
    }

    #[test]
    fn price_range_ignores_nan() {
        let mut bars = vec![bar(100.0, 1.0), bar(110.0, 1.0)];
        bars[1].low = f64::NAN;
        assert_eq!(price_range(&bars), Some((99.0, 111.0)));
        assert_eq!(price_range(&[]), None);
    }
}
