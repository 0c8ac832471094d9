use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry in the ledger.
///
/// Serialized with the camelCase field names the portfolio file uses
/// (`purchasePrice`, `currentPrice`, `purchaseDate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Ticker symbol, uppercased. Unique within a ledger.
    pub symbol: String,

    /// Display name from the quote lookup, if one was known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Units held (always positive)
    pub quantity: f64,

    /// Cost basis per unit
    pub purchase_price: f64,

    /// Latest known market price per unit
    pub current_price: f64,

    /// Day the position was opened
    pub purchase_date: NaiveDate,

    /// Hex display colour (`#RRGGBB` or `#RRGGBBAA`)
    pub color: String,
}

impl Holding {
    /// Name to show in legends: the quote name, or the symbol.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

/// Input for adding a holding.
///
/// Missing fields are filled when the draft is committed: purchase price
/// falls back to the current price, purchase date to today, colour to the
/// palette slot of the new ledger position.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingDraft {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: f64,
    pub purchase_price: Option<f64>,
    pub current_price: f64,
    pub purchase_date: Option<NaiveDate>,
    pub color: Option<String>,
}

impl HoldingDraft {
    pub fn new(symbol: impl Into<String>, quantity: f64, current_price: f64) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: None,
            quantity,
            purchase_price: None,
            current_price,
            purchase_date: None,
            color: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn with_purchase_date(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Effective cost basis per unit.
    pub fn effective_purchase_price(&self) -> f64 {
        self.purchase_price.unwrap_or(self.current_price)
    }
}

/// A staged edit of an existing holding.
///
/// Fields left as `None` keep their current value. The edit is validated as a
/// whole and either committed completely or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingEdit {
    pub quantity: Option<f64>,
    pub purchase_price: Option<f64>,
    pub current_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub color: Option<String>,
}

impl HoldingEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
