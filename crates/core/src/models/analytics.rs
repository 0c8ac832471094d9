use serde::{Deserialize, Serialize};

/// Derived metrics for the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Sum of `current_price × quantity`
    pub total_value: f64,

    /// Sum of `purchase_price × quantity`
    pub total_investment: f64,

    /// `total_value - total_investment`
    pub total_profit: f64,

    /// `total_profit / total_investment × 100`, or 0 without investment
    pub total_profit_percent: f64,

    /// Per-holding breakdown, in ledger order
    pub holdings: Vec<HoldingValuation>,
}

impl PortfolioValuation {
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// Derived metrics for one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub symbol: String,

    /// Hex display colour, copied from the holding
    pub color: String,

    /// `current_price × quantity`
    pub value: f64,

    /// `purchase_price × quantity`
    pub investment: f64,

    /// `value - investment`
    pub profit: f64,

    /// Return on this holding in percent
    pub profit_percent: f64,

    /// This holding's share of the total value in percent
    pub share_percent: f64,
}
