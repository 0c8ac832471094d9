use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::color::Rgba;

/// One point of the valuation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub total_value: f64,
    pub total_profitability_percent: f64,
}

/// Which chart the panel shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartViewMode {
    /// Share of total value per holding (pie or donut)
    #[default]
    Proportional,
    /// Value and profitability over time
    Trend,
}

/// Shape of the proportional chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    /// Full wedges starting at angle 0
    #[default]
    Pie,
    /// Ring segments starting at 12 o'clock
    Donut,
}

/// What happens to a drawing error once it has been caught.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderErrorPolicy {
    /// Drop the frame silently
    #[default]
    Suppress,
    /// Drop the frame and log the error
    Log,
}

/// Rendering knobs shared by both chart modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub style: ChartStyle,

    /// Inner radius of the donut as a fraction of the outer radius
    pub donut_inner_ratio: f64,

    /// Extra room above and below each trend series, as a fraction of its range
    pub padding_ratio: f64,

    /// Inset in surface units around the pie and the trend plot area
    pub margin: f64,

    /// Number of horizontal gridlines in trend mode
    pub gridlines: usize,

    pub render_errors: RenderErrorPolicy,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            style: ChartStyle::Pie,
            donut_inner_ratio: 0.4,
            padding_ratio: 0.1,
            margin: 10.0,
            gridlines: 5,
            render_errors: RenderErrorPolicy::Suppress,
        }
    }
}

/// A single slice of the proportional chart. Angles are in radians,
/// clockwise on a y-down surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub symbol: String,
    pub color: Rgba,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Share of total value in percent
    pub share_percent: f64,
}

impl Wedge {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// The slice of history visible in trend mode.
///
/// `offset` counts points back from the newest one, so `offset == 0` shows the
/// latest `visible_points` snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWindow {
    pub visible_points: usize,
    pub offset: usize,
}

impl TrendWindow {
    pub fn new(visible_points: usize) -> Self {
        Self {
            visible_points: visible_points.max(1),
            offset: 0,
        }
    }

    /// Largest offset that still keeps a full window inside `len` points.
    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.visible_points)
    }

    /// Shift the window by `delta` points (positive = further into the past),
    /// clamped to the available data.
    pub fn pan(&mut self, delta: isize, len: usize) {
        self.offset = self
            .offset
            .min(self.max_offset(len))
            .saturating_add_signed(delta)
            .min(self.max_offset(len));
    }

    /// Index range into a history of `len` points.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let offset = self.offset.min(self.max_offset(len));
        let end = len - offset;
        let start = end.saturating_sub(self.visible_points);
        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A text label anchored at a surface position.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Linear mapping of one series onto the plot's vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    /// Lower bound after padding
    pub min: f64,
    /// Upper bound after padding
    pub max: f64,
}

impl AxisScale {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything needed to draw the trend chart, in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLayout {
    /// Plot rectangle: left, top, width, height
    pub plot: (f64, f64, f64, f64),
    pub value_scale: AxisScale,
    pub profit_scale: AxisScale,
    pub value_points: Vec<Point>,
    pub profit_points: Vec<Point>,
    /// y positions of the horizontal gridlines
    pub gridlines: Vec<f64>,
    pub value_labels: Vec<AxisLabel>,
    pub profit_labels: Vec<AxisLabel>,
    pub time_labels: Vec<AxisLabel>,
}
