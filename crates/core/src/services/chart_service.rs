use std::f64::consts::{FRAC_PI_2, TAU};

use crate::errors::CoreError;
use crate::host::ChartSurface;
use crate::models::analytics::PortfolioValuation;
use crate::models::chart::{
    AxisLabel, AxisScale, ChartOptions, ChartStyle, ChartViewMode, Point, Snapshot, TrendLayout,
    Wedge,
};
use crate::models::color::{palette_color, Rgba};

/// Horizontal room reserved for axis labels on each side of the trend plot.
const LABEL_GUTTER: f64 = 48.0;
/// Vertical room reserved for time labels under the trend plot.
const TIME_GUTTER: f64 = 18.0;
const MARKER_RADIUS: f64 = 2.5;

const VALUE_SERIES_COLOR: Rgba = Rgba::new(0.306, 0.804, 0.769, 1.0);
const PROFIT_SERIES_COLOR: Rgba = Rgba::new(1.0, 0.902, 0.427, 1.0);
const GRID_COLOR: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.15);
const LABEL_COLOR: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.8);

/// Turns valuations and history into chart geometry and draws it.
///
/// Geometry is computed by pure functions (`proportional_wedges`,
/// `trend_layout`); the `render_*` functions only replay it onto a surface.
pub struct ChartService {
    options: ChartOptions,
}

impl ChartService {
    pub fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Slice a full circle by each holding's share of total value.
    ///
    /// Wedges follow ledger order and accumulate clockwise from angle 0 (pie)
    /// or from 12 o'clock (donut). The last wedge closes exactly one turn
    /// after the first starts. Nothing is produced when total value is 0.
    pub fn proportional_wedges(&self, valuation: &PortfolioValuation) -> Vec<Wedge> {
        let total = valuation.total_value;
        if !(total > 0.0) || !total.is_finite() {
            return Vec::new();
        }

        let start = match self.options.style {
            ChartStyle::Pie => 0.0,
            ChartStyle::Donut => -FRAC_PI_2,
        };
        let last = valuation.holdings.len().saturating_sub(1);

        let mut angle = start;
        let mut wedges = Vec::with_capacity(valuation.holdings.len());
        for (i, holding) in valuation.holdings.iter().enumerate() {
            let end = if i == last {
                start + TAU
            } else {
                angle + holding.value / total * TAU
            };
            let color = Rgba::from_hex(&holding.color)
                .or_else(|| Rgba::from_hex(palette_color(i)))
                .unwrap_or(Rgba::WHITE);
            wedges.push(Wedge {
                symbol: holding.symbol.clone(),
                color,
                start_angle: angle,
                end_angle: end,
                share_percent: holding.share_percent,
            });
            angle = end;
        }
        wedges
    }

    /// Lay out the trend chart for `points` (oldest first) on a surface of
    /// `size`. Returns `None` when there is nothing to draw or no room.
    pub fn trend_layout(&self, points: &[Snapshot], size: (f64, f64)) -> Option<TrendLayout> {
        if points.is_empty() {
            return None;
        }
        let (width, height) = size;
        let margin = self.options.margin;
        let left = margin + LABEL_GUTTER;
        let top = margin;
        let plot_w = width - 2.0 * (margin + LABEL_GUTTER);
        let plot_h = height - 2.0 * margin - TIME_GUTTER;
        if plot_w <= 0.0 || plot_h <= 0.0 {
            return None;
        }

        let values: Vec<f64> = points.iter().map(|p| p.total_value).collect();
        let profits: Vec<f64> = points
            .iter()
            .map(|p| p.total_profitability_percent)
            .collect();
        let value_scale = padded_scale(&values, self.options.padding_ratio);
        let profit_scale = padded_scale(&profits, self.options.padding_ratio);

        let n = points.len();
        let x_at = |i: usize| {
            if n == 1 {
                left + plot_w / 2.0
            } else {
                left + i as f64 * plot_w / (n - 1) as f64
            }
        };
        let y_at = |v: f64, scale: &AxisScale| top + plot_h - (v - scale.min) / scale.span() * plot_h;

        let value_points = values
            .iter()
            .enumerate()
            .map(|(i, v)| Point { x: x_at(i), y: y_at(*v, &value_scale) })
            .collect();
        let profit_points = profits
            .iter()
            .enumerate()
            .map(|(i, v)| Point { x: x_at(i), y: y_at(*v, &profit_scale) })
            .collect();

        let steps = self.options.gridlines.max(2);
        let mut gridlines = Vec::with_capacity(steps);
        let mut value_labels = Vec::with_capacity(steps);
        let mut profit_labels = Vec::with_capacity(steps);
        for k in 0..steps {
            let frac = k as f64 / (steps - 1) as f64;
            let y = top + plot_h * frac;
            gridlines.push(y);
            value_labels.push(AxisLabel {
                x: margin,
                y,
                text: format_value(value_scale.max - frac * value_scale.span()),
            });
            profit_labels.push(AxisLabel {
                x: left + plot_w + 4.0,
                y,
                text: format!("{:.1}%", profit_scale.max - frac * profit_scale.span()),
            });
        }

        let mut label_indices = vec![0, n / 2, n - 1];
        label_indices.dedup();
        let time_labels = label_indices
            .into_iter()
            .map(|i| AxisLabel {
                x: x_at(i),
                y: top + plot_h + TIME_GUTTER - 4.0,
                text: points[i].timestamp.format("%H:%M").to_string(),
            })
            .collect();

        Some(TrendLayout {
            plot: (left, top, plot_w, plot_h),
            value_scale,
            profit_scale,
            value_points,
            profit_points,
            gridlines,
            value_labels,
            profit_labels,
            time_labels,
        })
    }

    /// Draw the chart for `mode`. Errors from the surface are returned;
    /// the tracker decides whether to log or drop them.
    pub fn draw(
        &self,
        surface: &mut dyn ChartSurface,
        mode: ChartViewMode,
        valuation: &PortfolioValuation,
        history: &[Snapshot],
    ) -> Result<(), CoreError> {
        match mode {
            ChartViewMode::Proportional => {
                let wedges = self.proportional_wedges(valuation);
                self.render_proportional(surface, &wedges)
            }
            ChartViewMode::Trend => match self.trend_layout(history, surface.size()) {
                Some(layout) => self.render_trend(surface, &layout),
                None => Ok(()),
            },
        }
    }

    pub fn render_proportional(
        &self,
        surface: &mut dyn ChartSurface,
        wedges: &[Wedge],
    ) -> Result<(), CoreError> {
        if wedges.is_empty() {
            return Ok(());
        }
        let (width, height) = surface.size();
        let radius = width.min(height) / 2.0 - self.options.margin;
        if radius <= 0.0 {
            return Err(CoreError::Render(format!(
                "surface {width}x{height} too small for a pie chart"
            )));
        }
        let (cx, cy) = (width / 2.0, height / 2.0);
        let inner = radius * self.options.donut_inner_ratio;

        for wedge in wedges.iter().filter(|w| w.sweep() > 0.0) {
            match self.options.style {
                ChartStyle::Pie => {
                    surface.move_to(cx, cy);
                    surface.arc(cx, cy, radius, wedge.start_angle, wedge.end_angle);
                    surface.close_path();
                }
                ChartStyle::Donut => {
                    surface.arc(cx, cy, radius, wedge.start_angle, wedge.end_angle);
                    surface.arc_negative(cx, cy, inner, wedge.end_angle, wedge.start_angle);
                    surface.close_path();
                }
            }
            surface.set_source_rgba(wedge.color.with_alpha(0.9));
            surface.fill()?;

            // faint border along the outer edge
            surface.arc(cx, cy, radius, wedge.start_angle, wedge.end_angle);
            surface.set_source_rgba(Rgba::WHITE.with_alpha(0.3));
            surface.set_line_width(1.0);
            surface.stroke()?;
        }
        Ok(())
    }

    pub fn render_trend(
        &self,
        surface: &mut dyn ChartSurface,
        layout: &TrendLayout,
    ) -> Result<(), CoreError> {
        let (left, _, plot_w, _) = layout.plot;

        surface.set_source_rgba(GRID_COLOR);
        surface.set_line_width(0.5);
        for y in &layout.gridlines {
            surface.move_to(left, *y);
            surface.line_to(left + plot_w, *y);
        }
        surface.stroke()?;

        for (points, color) in [
            (&layout.value_points, VALUE_SERIES_COLOR),
            (&layout.profit_points, PROFIT_SERIES_COLOR),
        ] {
            surface.set_source_rgba(color);
            surface.set_line_width(2.0);
            if let Some((first, rest)) = points.split_first() {
                surface.move_to(first.x, first.y);
                for p in rest {
                    surface.line_to(p.x, p.y);
                }
                surface.stroke()?;
            }
            for p in points.iter() {
                surface.move_to(p.x + MARKER_RADIUS, p.y);
                surface.arc(p.x, p.y, MARKER_RADIUS, 0.0, TAU);
                surface.fill()?;
            }
        }

        surface.set_source_rgba(LABEL_COLOR);
        for label in layout
            .value_labels
            .iter()
            .chain(&layout.profit_labels)
            .chain(&layout.time_labels)
        {
            surface.show_text(label.x, label.y, &label.text)?;
        }
        Ok(())
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new(ChartOptions::default())
    }
}

/// Min–max scale with `ratio` of the range added on both ends.
/// A flat series pads by `ratio × |value|`, or by 1 when that is 0 too.
fn padded_scale(values: &[f64], ratio: f64) -> AxisScale {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let pad = if range > 0.0 {
        range * ratio
    } else {
        let p = min.abs() * ratio;
        if p > 0.0 {
            p
        } else {
            1.0
        }
    };
    AxisScale {
        min: min - pad,
        max: max + pad,
    }
}

fn format_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
