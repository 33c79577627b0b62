//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! Plotters gives us axis and label rendering for free, and we render its
//! output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesStyle {
    /// Connected line with a dot at each point.
    Line,
    /// Filled bars rising from the bottom of the y range.
    Bars { half_width: f64 },
}

#[derive(Debug, Clone)]
pub struct Series<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
    pub style: SeriesStyle,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct DashPlottersChart<'a> {
    pub series: Vec<Series<'a>>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DashPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 16 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !bounds_ok(self.x_bounds) || !bounds_ok(self.y_bounds) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(self.x_ticks)
                .y_labels(self.y_ticks)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in &self.series {
                let color = series.color;
                match series.style {
                    SeriesStyle::Line => {
                        chart.draw_series(LineSeries::new(series.points.iter().copied(), &color))?;
                        // `Circle` radii map badly onto the terminal canvas; a
                        // colored `Pixel` marks each point instead.
                        chart.draw_series(series.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                    }
                    SeriesStyle::Bars { half_width } => {
                        let fill = ShapeStyle::from(&color).filled();
                        chart.draw_series(series.points.iter().map(|&(x, y)| {
                            Rectangle::new([(x - half_width, y0), (x + half_width, y.clamp(y0, y1))], fill)
                        }))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn bounds_ok([lo, hi]: [f64; 2]) -> bool {
    lo.is_finite() && hi.is_finite() && hi > lo
}

/// `[lo, hi]` covering `values` with a fractional pad on each side.
///
/// Falls back to `[0, 1]` when there is nothing to bound.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>, pad_frac: f64, floor_at_zero: bool) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if floor_at_zero {
        lo = lo.min(0.0);
    }
    let pad = ((hi - lo).abs() * pad_frac).max(1.0);
    let lo = if floor_at_zero { lo } else { lo - pad };
    [lo, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_bounds_cover_values() {
        assert_eq!(padded_bounds([70.0, 80.0], 0.5, false), [65.0, 85.0]);
        assert_eq!(padded_bounds([100.0, 300.0], 0.5, true), [0.0, 450.0]);
    }

    #[test]
    fn padded_bounds_fallback_for_empty_input() {
        assert_eq!(padded_bounds(std::iter::empty(), 0.1, true), [0.0, 1.0]);
        assert_eq!(padded_bounds([f64::NAN], 0.1, true), [0.0, 1.0]);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        assert!(bounds_ok([0.0, 1.0]));
        assert!(!bounds_ok([1.0, 1.0]));
        assert!(!bounds_ok([0.0, f64::INFINITY]));
    }
}
