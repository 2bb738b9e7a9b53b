// =============================================================================
// PNG chart (feature = "chart")
// =============================================================================
//
// Upper panel: close with the fast and slow SMA. Lower panel: trend score
// with the uptrend / downtrend cutoffs as reference lines. Both panels are
// shaded by trend label: green up, red down, grey sideways.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use plotters::prelude::*;
use tracing::info;

use crate::regime::{TrendLabel, TrendThresholds};
use crate::report::ReportSink;
use crate::signals::TrendTable;

const SIZE: (u32, u32) = (1280, 800);
const PRICE_PANEL_HEIGHT: u32 = 540;
const SHADE_ALPHA: f64 = 0.12;

pub struct ChartRenderer {
    path: PathBuf,
    thresholds: TrendThresholds,
}

impl ChartRenderer {
    pub fn new(path: impl Into<PathBuf>, thresholds: TrendThresholds) -> Self {
        Self {
            path: path.into(),
            thresholds,
        }
    }
}

impl ReportSink for ChartRenderer {
    fn render(&mut self, table: &TrendTable) -> Result<()> {
        let rows = table.rows();
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            bail!("nothing to chart for {}", table.symbol());
        };
        if first.timestamp == last.timestamp {
            bail!("need at least two bars to chart {}", table.symbol());
        }

        let (lo, hi) = rows
            .iter()
            .flat_map(|r| [Some(r.close), r.indicators.sma_fast, r.indicators.sma_slow])
            .flatten()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let pad = ((hi - lo) * 0.05).max(1.0);
        let x_range = first.timestamp..last.timestamp;
        let spans = label_spans(rows.iter().map(|r| (r.timestamp, r.trend_label)));

        let root = BitMapBackend::new(&self.path, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (upper, lower) = root.split_vertically(PRICE_PANEL_HEIGHT);

        let mut price = ChartBuilder::on(&upper)
            .caption(
                format!("{} ({}) trend", table.symbol(), table.interval()),
                ("sans-serif", 24),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), (lo - pad)..(hi + pad))
            .map_err(draw_err)?;
        price.configure_mesh().draw().map_err(draw_err)?;
        price
            .draw_series(spans.iter().map(|&(from, to, label)| {
                Rectangle::new([(from, lo - pad), (to, hi + pad)], shade(label).filled())
            }))
            .map_err(draw_err)?;

        price
            .draw_series(LineSeries::new(
                rows.iter().map(|r| (r.timestamp, r.close)),
                &BLACK,
            ))
            .map_err(draw_err)?
            .label("close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

        let smas = [
            ("SMA fast", BLUE, rows.iter().map(|r| (r.timestamp, r.indicators.sma_fast)).collect::<Vec<_>>()),
            ("SMA slow", RED, rows.iter().map(|r| (r.timestamp, r.indicators.sma_slow)).collect::<Vec<_>>()),
        ];
        for (name, color, points) in smas {
            price
                .draw_series(LineSeries::new(
                    points.into_iter().filter_map(|(t, v)| v.map(|v| (t, v))),
                    color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        price
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        let mut score = ChartBuilder::on(&lower)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, -6.5f64..6.5f64)
            .map_err(draw_err)?;
        score
            .configure_mesh()
            .y_desc("score")
            .draw()
            .map_err(draw_err)?;
        score
            .draw_series(spans.iter().map(|&(from, to, label)| {
                Rectangle::new([(from, -6.5), (to, 6.5)], shade(label).filled())
            }))
            .map_err(draw_err)?;

        score
            .draw_series(LineSeries::new(
                rows.iter().map(|r| (r.timestamp, f64::from(r.trend_score))),
                GREEN.stroke_width(2),
            ))
            .map_err(draw_err)?;
        for cutoff in [self.thresholds.uptrend_score, self.thresholds.downtrend_score] {
            let y = f64::from(cutoff);
            score
                .draw_series(LineSeries::new(
                    [(first.timestamp, y), (last.timestamp, y)],
                    RED.mix(0.5),
                ))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        info!(path = %self.path.display(), symbol = table.symbol(), "chart written");
        Ok(())
    }
}

/// Merges consecutive bars with the same label into `(from, to, label)`
/// spans. A span runs until the first bar of the next span; the last one
/// ends at the last bar.
fn label_spans(
    points: impl IntoIterator<Item = (DateTime<Utc>, TrendLabel)>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>, TrendLabel)> {
    let mut spans: Vec<(DateTime<Utc>, DateTime<Utc>, TrendLabel)> = Vec::new();
    for (ts, label) in points {
        match spans.last_mut() {
            Some(span) if span.2 == label => span.1 = ts,
            Some(span) => {
                span.1 = ts;
                spans.push((ts, ts, label));
            }
            None => spans.push((ts, ts, label)),
        }
    }
    spans
}

fn shade(label: TrendLabel) -> RGBAColor {
    match label {
        TrendLabel::Uptrend => GREEN.mix(SHADE_ALPHA),
        TrendLabel::Downtrend => RED.mix(SHADE_ALPHA),
        TrendLabel::Sideways => RGBColor(128, 128, 128).mix(SHADE_ALPHA),
    }
}

fn draw_err(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("chart drawing failed: {e}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::IndicatorParams;
    use crate::market_data::bar::tests::bar_at;
    use crate::market_data::BarSeries;
    use crate::types::Interval;

    fn at(day: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + day * 86_400, 0).unwrap()
    }

    #[test]
    fn spans_merge_equal_labels() {
        use TrendLabel::*;
        let points = [
            (at(0), Sideways),
            (at(1), Sideways),
            (at(2), Uptrend),
            (at(3), Uptrend),
            (at(4), Uptrend),
            (at(5), Downtrend),
        ];
        assert_eq!(
            label_spans(points),
            vec![
                (at(0), at(2), Sideways),
                (at(2), at(5), Uptrend),
                (at(5), at(5), Downtrend),
            ]
        );
    }

    #[test]
    fn spans_cover_the_whole_axis() {
        let points = (0..10).map(|d| {
            let label = if d % 3 == 0 { TrendLabel::Uptrend } else { TrendLabel::Sideways };
            (at(d), label)
        });
        let spans = label_spans(points);
        assert_eq!(spans.first().map(|s| s.0), Some(at(0)));
        assert_eq!(spans.last().map(|s| s.1), Some(at(9)));
        assert!(spans.windows(2).all(|w| w[0].1 == w[1].0 && w[0].2 != w[1].2));
    }

    #[test]
    fn no_spans_without_bars() {
        assert!(label_spans(std::iter::empty()).is_empty());
    }

    #[test]
    fn shading_follows_the_label() {
        assert_ne!(shade(TrendLabel::Uptrend), shade(TrendLabel::Downtrend));
        assert_ne!(shade(TrendLabel::Sideways), shade(TrendLabel::Uptrend));
        assert_eq!(shade(TrendLabel::Uptrend).3, SHADE_ALPHA);
    }

    #[test]
    fn single_bar_is_not_charted() {
        let series = BarSeries::new("GC=F", Interval::Day1, vec![bar_at(0, 2000.0)]);
        let table =
            TrendTable::score(&series, &IndicatorParams::default(), &TrendThresholds::default())
                .unwrap();
        let path = std::env::temp_dir().join("aurum-trend-single-bar.png");
        let mut chart = ChartRenderer::new(path, TrendThresholds::default());
        let err = chart.render(&table).unwrap_err();
        assert!(err.to_string().contains("at least two bars"));
    }
}
