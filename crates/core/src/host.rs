//! Capabilities the embedding UI hands to the core.
//!
//! The core never owns panel buttons, popups or drawing areas. It calls into
//! these traits; the host decides what they mean on screen.

use crate::errors::CoreError;
use crate::models::analytics::PortfolioValuation;
use crate::models::color::Rgba;

/// The panel the portfolio lives in.
pub trait PanelHost: Send {
    /// The ledger changed; `valuation` reflects the new state.
    fn on_portfolio_changed(&mut self, valuation: &PortfolioValuation);

    /// Ask the host to schedule a chart repaint.
    fn request_repaint(&mut self);

    /// Short user-facing message (e.g. "Added 10 AAPL").
    fn notify(&mut self, message: &str);
}

/// A cairo-like 2D drawing target.
///
/// Path-building calls are infallible; `fill`, `stroke` and `show_text`
/// consume the current path and may fail.
pub trait ChartSurface {
    /// Width and height in surface units.
    fn size(&self) -> (f64, f64);

    fn set_source_rgba(&mut self, color: Rgba);

    fn set_line_width(&mut self, width: f64);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Clockwise arc (increasing angle) around `(cx, cy)`.
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);

    /// Counter-clockwise arc (decreasing angle) around `(cx, cy)`.
    fn arc_negative(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);

    fn close_path(&mut self);

    fn fill(&mut self) -> Result<(), CoreError>;

    fn stroke(&mut self) -> Result<(), CoreError>;

    fn show_text(&mut self, x: f64, y: f64, text: &str) -> Result<(), CoreError>;
}
