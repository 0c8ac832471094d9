//! Lenient parsing of numbers typed into entry fields.
//!
//! Bad input is never an error here: it falls back to a caller-chosen value
//! (usually the previous one, or 1 for a fresh quantity).

/// Parse a positive quantity, or return `fallback`.
pub fn parse_quantity(text: &str, fallback: f64) -> f64 {
    parse_positive(text).unwrap_or(fallback)
}

/// Parse a positive price, or return `fallback`.
pub fn parse_price(text: &str, fallback: f64) -> f64 {
    parse_positive(text).unwrap_or(fallback)
}

/// Trimmed decimal with `.` or `,` as separator; only finite values > 0.
pub fn parse_positive(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
