use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use panel_portfolio_core::errors::CoreError;
use panel_portfolio_core::host::ChartSurface;
use panel_portfolio_core::models::color::Rgba;

const BACKGROUND: &str = "#1E1E1E";

/// A `ChartSurface` that records drawing calls as SVG elements.
///
/// Arcs follow cairo's rules: they start with a line from the current point
/// (or a move when there is none) and are split into segments of at most π so
/// each maps onto a single SVG `A` command.
pub struct SvgSurface {
    width: f64,
    height: f64,
    color: Rgba,
    line_width: f64,
    path: String,
    current: Option<(f64, f64)>,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            color: Rgba::WHITE,
            line_width: 1.0,
            path: String::new(),
            current: None,
            elements: Vec::new(),
        }
    }

    /// The finished SVG document.
    pub fn finish(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="{BACKGROUND}"/>"#);
        for element in &self.elements {
            let _ = writeln!(out, "  {element}");
        }
        out.push_str("</svg>\n");
        out
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn push_point(&mut self, cmd: char, x: f64, y: f64) {
        let _ = write!(self.path, "{cmd}{} {} ", fmt_num(x), fmt_num(y));
        self.current = Some((x, y));
    }

    fn arc_path(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, positive: bool) {
        let start_point = (cx + radius * start.cos(), cy + radius * start.sin());
        if self.current.is_some() {
            self.push_point('L', start_point.0, start_point.1);
        } else {
            self.push_point('M', start_point.0, start_point.1);
        }

        let mut sweep = if positive { end - start } else { start - end };
        if sweep < 0.0 {
            sweep += TAU * (-sweep / TAU).ceil();
        }
        let sweep = sweep.min(TAU);
        let segments = (sweep / PI).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let direction = if positive { 1.0 } else { -1.0 };
        let flag = if positive { 1 } else { 0 };

        for i in 1..=segments {
            let angle = start + direction * step * i as f64;
            let (x, y) = (cx + radius * angle.cos(), cy + radius * angle.sin());
            let _ = write!(
                self.path,
                "A{r} {r} 0 0 {flag} {} {} ",
                fmt_num(x),
                fmt_num(y),
                r = fmt_num(radius)
            );
            self.current = Some((x, y));
        }
    }

    /// Emit the current path as an element and start a new one.
    fn flush(&mut self, attrs: String) -> Result<(), CoreError> {
        let d = std::mem::take(&mut self.path);
        self.current = None;
        if d.contains("NaN") || d.contains("inf") {
            return Err(CoreError::Render(format!("non-finite coordinate in path '{}'", d.trim())));
        }
        if !d.is_empty() {
            self.elements
                .push(format!(r#"<path d="{}" {attrs}/>"#, d.trim_end()));
        }
        Ok(())
    }
}

impl ChartSurface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_source_rgba(&mut self, color: Rgba) {
        self.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push_point('M', x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_point('L', x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.arc_path(cx, cy, radius, start, end, true);
    }

    fn arc_negative(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.arc_path(cx, cy, radius, start, end, false);
    }

    fn close_path(&mut self) {
        self.path.push_str("Z ");
    }

    fn fill(&mut self) -> Result<(), CoreError> {
        let attrs = format!(
            r#"fill="{}" fill-opacity="{}""#,
            self.color.to_hex(),
            fmt_num(self.color.a)
        );
        self.flush(attrs)
    }

    fn stroke(&mut self) -> Result<(), CoreError> {
        let attrs = format!(
            r#"fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}""#,
            self.color.to_hex(),
            fmt_num(self.color.a),
            fmt_num(self.line_width)
        );
        self.flush(attrs)
    }

    fn show_text(&mut self, x: f64, y: f64, text: &str) -> Result<(), CoreError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(CoreError::Render(format!("label '{text}' has no position")));
        }
        self.elements.push(format!(
            r#"<text x="{}" y="{}" fill="{}" fill-opacity="{}" font-size="10" font-family="sans-serif">{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            self.color.to_hex(),
            fmt_num(self.color.a),
            escape(text)
        ));
        Ok(())
    }
}

fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
