use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::models::color::{palette_color, Rgba};
use crate::models::holding::Holding;
use crate::models::ledger::Ledger;

/// Format version written into every portfolio file.
pub const CURRENT_VERSION: &str = "1.0";

/// On-disk shape of the portfolio file:
///
/// ```text
/// { "version": "1.0", "lastUpdate": "<RFC 3339>", "assets": [Holding, ...] }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument<'a> {
    pub version: &'a str,
    pub last_update: DateTime<Utc>,
    pub assets: &'a [Holding],
}

/// A parsed portfolio file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub version: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub ledger: Ledger,
}

/// Serialize `ledger` as a pretty-printed document stamped with `now`.
pub fn write_document(ledger: &Ledger, now: DateTime<Utc>) -> Result<String, CoreError> {
    let doc = PortfolioDocument {
        version: CURRENT_VERSION,
        last_update: now,
        assets: &ledger.holdings,
    };
    serde_json::to_string_pretty(&doc)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
}

/// Parse a document, coercing malformed holdings to safe defaults.
///
/// Errors only for payloads that are not a document at all: empty text,
/// invalid JSON, a non-object root or a non-array `assets`. A missing
/// `assets` key is an empty ledger. Entries without a symbol are dropped.
pub fn read_document(text: &str, today: NaiveDate) -> Result<LoadedDocument, CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::InvalidDocument("file is empty".into()));
    }
    let root: Value = serde_json::from_str(text)?;
    let Value::Object(root) = root else {
        return Err(CoreError::InvalidDocument(
            "top-level value is not an object".into(),
        ));
    };

    let version = root
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);
    let last_update = root
        .get("lastUpdate")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let entries: &[Value] = match root.get("assets") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(CoreError::InvalidDocument("'assets' is not an array".into()));
        }
    };

    let mut holdings: Vec<Holding> = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry {
            Value::Object(fields) => match coerce_holding(fields, holdings.len(), today) {
                Some(h) => holdings.push(h),
                None => log::warn!("Dropping asset #{i}: no symbol"),
            },
            _ => log::warn!("Dropping asset #{i}: not an object"),
        }
    }

    Ok(LoadedDocument {
        version,
        last_update,
        ledger: Ledger::from_holdings(holdings),
    })
}

/// Build a holding from loosely-typed JSON fields.
///
/// - quantity: positive number (or numeric string), else 1
/// - purchasePrice: falls back to legacy `price`, then `currentPrice`, then 0
/// - currentPrice: falls back to legacy `price`, then `purchasePrice`, then 0
/// - purchaseDate: ISO date (timestamps are cut to the date), else `today`
/// - color: valid hex, else the palette colour of `index`
fn coerce_holding(fields: &Map<String, Value>, index: usize, today: NaiveDate) -> Option<Holding> {
    let symbol = fields
        .get("symbol")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())?;

    let legacy_price = positive_number(fields.get("price"));
    let stored_purchase = positive_number(fields.get("purchasePrice"));
    let stored_current = positive_number(fields.get("currentPrice"));

    let quantity = positive_number(fields.get("quantity")).unwrap_or(1.0);
    let purchase_price = stored_purchase
        .or(legacy_price)
        .or(stored_current)
        .unwrap_or(0.0);
    let current_price = stored_current
        .or(legacy_price)
        .or(stored_purchase)
        .unwrap_or(0.0);

    let purchase_date = fields
        .get("purchaseDate")
        .and_then(Value::as_str)
        .and_then(parse_iso_date)
        .unwrap_or(today);

    let color = fields
        .get("color")
        .and_then(Value::as_str)
        .filter(|c| Rgba::from_hex(c).is_some())
        .map(str::to_string)
        .unwrap_or_else(|| palette_color(index).to_string());

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Some(Holding {
        symbol,
        name,
        quantity,
        purchase_price,
        current_price,
        purchase_date,
        color,
    })
}

fn positive_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => crate::input::parse_positive(s)?,
        _ => return None,
    };
    (n.is_finite() && n > 0.0).then_some(n)
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let day = text.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
