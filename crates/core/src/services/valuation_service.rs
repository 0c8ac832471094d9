use crate::models::analytics::{HoldingValuation, PortfolioValuation};
use crate::models::ledger::Ledger;

/// Computes portfolio metrics from the ledger alone.
///
/// Pure: no prices are fetched, no state is kept. Every division is guarded
/// and yields 0 instead of NaN or infinity.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value, investment, profit and share for each holding plus the totals.
    pub fn valuate(&self, ledger: &Ledger) -> PortfolioValuation {
        let mut holdings: Vec<HoldingValuation> = ledger
            .iter()
            .map(|h| {
                let value = h.current_price * h.quantity;
                let investment = h.purchase_price * h.quantity;
                HoldingValuation {
                    symbol: h.symbol.clone(),
                    color: h.color.clone(),
                    value,
                    investment,
                    profit: value - investment,
                    profit_percent: percent_change(value, investment),
                    share_percent: 0.0, // filled below
                }
            })
            .collect();

        let total_value: f64 = holdings.iter().map(|h| h.value).sum();
        let total_investment: f64 = holdings.iter().map(|h| h.investment).sum();

        for holding in &mut holdings {
            holding.share_percent = if total_value > 0.0 {
                holding.value / total_value * 100.0
            } else {
                0.0
            };
        }

        PortfolioValuation {
            total_value,
            total_investment,
            total_profit: total_value - total_investment,
            total_profit_percent: percent_change(total_value, total_investment),
            holdings,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

/// `(value - base) / base × 100`, or 0 when there is no positive base.
pub fn percent_change(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base * 100.0
    } else {
        0.0
    }
}
