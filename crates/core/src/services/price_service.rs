use futures::future::join_all;

use crate::models::ledger::Ledger;
use crate::models::quote::Quote;
use crate::providers::traits::QuoteProvider;
use crate::services::ledger_service::LedgerService;

/// Result of one symbol's lookup during a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteOutcome {
    pub symbol: String,
    pub quote: Option<Quote>,
}

/// Summary of a refresh round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    /// Symbols whose current price was updated
    pub updated: Vec<String>,
    /// Symbols whose lookup produced no usable quote
    pub failed: Vec<String>,
}

impl RefreshReport {
    pub fn requested(&self) -> usize {
        self.updated.len() + self.failed.len()
    }

    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Fetches current prices for a set of holdings.
///
/// One lookup per symbol, all in flight at once with no cap. The round is
/// only reported once every lookup has completed or failed.
pub struct PriceService {
    ledger_service: LedgerService,
}

impl PriceService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
        }
    }

    /// Look up every symbol concurrently.
    pub async fn fetch_all(
        &self,
        provider: &dyn QuoteProvider,
        symbols: &[String],
    ) -> Vec<QuoteOutcome> {
        let lookups = symbols.iter().map(|symbol| async move {
            let quote = match provider.quote(symbol).await {
                Ok(q) => q,
                Err(e) => {
                    log::warn!("{}: quote for {symbol} failed: {e}", provider.name());
                    None
                }
            };
            QuoteOutcome {
                symbol: symbol.clone(),
                quote,
            }
        });
        join_all(lookups).await
    }

    /// Write fetched prices into the ledger.
    ///
    /// Outcomes for symbols no longer in the ledger are ignored. A holding
    /// without a name picks up the quote's name.
    pub fn apply(&self, ledger: &mut Ledger, outcomes: Vec<QuoteOutcome>) -> RefreshReport {
        let mut report = RefreshReport::default();
        for outcome in outcomes {
            let Some(quote) = outcome.quote else {
                report.failed.push(outcome.symbol);
                continue;
            };
            if self
                .ledger_service
                .update_price(ledger, &outcome.symbol, quote.price)
            {
                if let Some(idx) = ledger.position_of(&outcome.symbol) {
                    let holding = &mut ledger.holdings[idx];
                    if holding.name.is_none() {
                        holding.name = Some(quote.name);
                    }
                }
                report.updated.push(outcome.symbol);
            } else {
                report.failed.push(outcome.symbol);
            }
        }
        report
    }
}

impl Default for PriceService {
    fn default() -> Self {
        Self::new()
    }
}
