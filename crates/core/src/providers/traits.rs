use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::{Quote, Suggestion};

/// Source of live quotes and ticker suggestions.
///
/// Lookups are best-effort: anything that goes wrong on the wire resolves to
/// `Ok(None)` / an empty list. Only a request that cannot even be built is an
/// error.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest quote for `symbol`, or `None` if it could not be resolved.
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, CoreError>;

    /// Equity tickers matching a partial `query`.
    async fn suggest(&self, query: &str) -> Vec<Suggestion>;
}
