use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::quote::Suggestion;
use crate::providers::traits::QuoteProvider;

/// Debounces ticker suggestions while the user types.
///
/// Every `submit` supersedes the ones before it. A query only reaches the
/// provider if no newer query arrived during the quiet period. Requests that
/// are already in flight are not cancelled.
pub struct SuggestionDebouncer {
    provider: Arc<dyn QuoteProvider>,
    delay: Duration,
    generation: AtomicU64,
}

impl SuggestionDebouncer {
    pub fn new(provider: Arc<dyn QuoteProvider>, delay: Duration) -> Self {
        Self {
            provider,
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Wait out the quiet period, then look up `query`.
    ///
    /// Returns `None` when a newer query was submitted in the meantime.
    pub async fn submit(&self, query: &str) -> Option<Vec<Suggestion>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if !self.is_current(ticket) {
            log::debug!("Suggestion query '{query}' superseded");
            return None;
        }
        Some(self.provider.suggest(query).await)
    }

    /// Whether `ticket` is still the latest submission.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
