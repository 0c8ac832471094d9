pub mod errors;
pub mod host;
pub mod input;
pub mod models;
pub mod providers;
pub mod scheduler;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use errors::CoreError;
use host::{ChartSurface, PanelHost};
use models::{
    analytics::PortfolioValuation,
    chart::{ChartViewMode, RenderErrorPolicy, Snapshot, TrendWindow},
    holding::{Holding, HoldingDraft, HoldingEdit},
    ledger::Ledger,
    quote::{Quote, Suggestion},
    settings::Settings,
};
use providers::{traits::QuoteProvider, yahoo_finance::YahooFinanceProvider};
use services::{
    chart_service::ChartService,
    history_service::HistoryRecorder,
    ledger_service::{AddOutcome, LedgerService},
    price_service::{PriceService, QuoteOutcome, RefreshReport},
    suggestion_service::SuggestionDebouncer,
    valuation_service::ValuationService,
};
use storage::{manager::StorageManager, paths};

/// Main entry point for the panel-portfolio core library.
///
/// Holds the ledger, the valuation history and the chart view state. Every
/// mutation runs the same pipeline: recompute → tell the host → request a
/// repaint → persist.
#[must_use]
pub struct PortfolioTracker {
    settings: Settings,
    ledger: Ledger,
    history: HistoryRecorder,
    view_mode: ChartViewMode,
    trend_window: TrendWindow,
    ledger_service: LedgerService,
    valuation_service: ValuationService,
    chart_service: ChartService,
    price_service: PriceService,
    provider: Arc<dyn QuoteProvider>,
    host: Option<Box<dyn PanelHost>>,
    /// Where mutations are persisted; `None` keeps everything in memory.
    data_file: Option<PathBuf>,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("holdings", &self.ledger.len())
            .field("history", &self.history.len())
            .field("view_mode", &self.view_mode)
            .field("provider", &self.provider.name())
            .field("data_file", &self.data_file)
            .finish()
    }
}

impl PortfolioTracker {
    /// Load the portfolio from disk (or start empty) with the default provider.
    ///
    /// The file is `settings.data_file` when set, otherwise resolved under the
    /// user data/config directory. A missing file is created empty.
    pub fn open(settings: Settings) -> Self {
        let path = settings
            .data_file
            .clone()
            .unwrap_or_else(|| paths::resolve_data_file(&settings.app_namespace));
        let existed = path.exists();
        let ledger = StorageManager::load_from_file(&path);

        let mut tracker = Self::build(settings, ledger);
        tracker.data_file = Some(path);
        if !existed {
            tracker.persist();
        }
        tracker
    }

    /// A tracker that never touches the filesystem.
    pub fn in_memory(settings: Settings) -> Self {
        Self::build(settings, Ledger::new())
    }

    /// A tracker over an existing ledger, kept in memory.
    pub fn from_ledger(settings: Settings, ledger: Ledger) -> Self {
        Self::build(settings, ledger)
    }

    /// Replace the quote provider (e.g. a mirror or a test double).
    pub fn with_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Attach the host panel that mirrors the portfolio.
    pub fn with_host(mut self, host: Box<dyn PanelHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Persist to `path` from now on.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    // ── Ledger ──────────────────────────────────────────────────────

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.ledger.holdings
    }

    /// Symbols in ledger order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.ledger.symbols()
    }

    /// Add a holding, merging into an existing one with the same symbol.
    pub fn add_holding(&mut self, draft: HoldingDraft) -> Result<AddOutcome, CoreError> {
        let quantity = draft.quantity;
        let outcome = self.ledger_service.add_holding(&mut self.ledger, draft)?;
        let symbol = self.ledger.holdings[outcome.index()].symbol.clone();
        self.after_mutation();
        self.notify(&format!("Added {quantity} {symbol}"));
        Ok(outcome)
    }

    /// Look `symbol` up and add `quantity` units at the quoted price.
    ///
    /// `Ok(None)` when the symbol could not be resolved.
    pub async fn add_from_quote(
        &mut self,
        symbol: &str,
        quantity: f64,
    ) -> Result<Option<AddOutcome>, CoreError> {
        let Some(quote) = self.provider.quote(symbol).await? else {
            self.notify(&format!("Asset \"{}\" not found", symbol.trim().to_uppercase()));
            return Ok(None);
        };
        let draft = HoldingDraft::new(&quote.symbol, quantity, quote.price).with_name(quote.name);
        self.add_holding(draft).map(Some)
    }

    /// Commit a staged edit to the holding at `index`.
    pub fn edit_holding(&mut self, index: usize, edit: HoldingEdit) -> Result<(), CoreError> {
        self.ledger_service
            .edit_holding(&mut self.ledger, index, edit)?;
        let symbol = self.ledger.holdings[index].symbol.clone();
        self.after_mutation();
        self.notify(&format!("Updated {symbol}"));
        Ok(())
    }

    /// Delete the holding at `index`.
    pub fn remove_holding(&mut self, index: usize) -> Result<Holding, CoreError> {
        let removed = self
            .ledger_service
            .remove_holding(&mut self.ledger, index)?;
        self.after_mutation();
        self.notify(&format!("Removed {}", removed.symbol));
        Ok(removed)
    }

    // ── Valuation & History ─────────────────────────────────────────

    #[must_use]
    pub fn valuation(&self) -> PortfolioValuation {
        self.valuation_service.valuate(&self.ledger)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    /// Append a snapshot of the current totals. `false` if it was skipped.
    pub fn record_snapshot(&mut self) -> bool {
        self.record_snapshot_at(Utc::now())
    }

    pub fn record_snapshot_at(&mut self, timestamp: DateTime<Utc>) -> bool {
        let valuation = self.valuation();
        self.history.record(&valuation, timestamp)
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// The provider shared with background tasks.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn QuoteProvider> {
        Arc::clone(&self.provider)
    }

    /// Single quote lookup.
    pub async fn lookup_quote(&self, symbol: &str) -> Result<Option<Quote>, CoreError> {
        self.provider.quote(symbol).await
    }

    /// Suggestions for a partial query, without debouncing.
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        self.provider.suggest(query).await
    }

    /// A debouncer over this tracker's provider, using the configured delay.
    #[must_use]
    pub fn suggestion_debouncer(&self) -> SuggestionDebouncer {
        SuggestionDebouncer::new(
            self.provider(),
            Duration::from_millis(self.settings.suggestion_debounce_ms),
        )
    }

    /// Fetch all current prices and apply them.
    pub async fn refresh_prices(&mut self) -> RefreshReport {
        let symbols = self.symbols();
        let outcomes = self
            .price_service
            .fetch_all(self.provider.as_ref(), &symbols)
            .await;
        self.apply_quotes(outcomes)
    }

    /// Apply a completed batch of lookups, then record a history snapshot.
    pub fn apply_quotes(&mut self, outcomes: Vec<QuoteOutcome>) -> RefreshReport {
        let report = self.price_service.apply(&mut self.ledger, outcomes);
        if report.changed() {
            self.after_mutation();
        }
        self.record_snapshot();
        report
    }

    // ── Chart ───────────────────────────────────────────────────────

    #[must_use]
    pub fn view_mode(&self) -> ChartViewMode {
        self.view_mode
    }

    /// Switch chart mode. Entering trend mode records a fresh snapshot.
    pub fn set_view_mode(&mut self, mode: ChartViewMode) {
        if mode == ChartViewMode::Trend && self.view_mode != ChartViewMode::Trend {
            self.record_snapshot();
        }
        self.view_mode = mode;
        self.request_repaint();
    }

    #[must_use]
    pub fn trend_window(&self) -> TrendWindow {
        self.trend_window
    }

    /// Scroll the trend window by `delta` points (positive = older).
    pub fn pan_trend(&mut self, delta: isize) {
        self.trend_window.pan(delta, self.history.len());
        self.request_repaint();
    }

    /// History points currently visible in trend mode, oldest first.
    #[must_use]
    pub fn visible_history(&self) -> Vec<Snapshot> {
        self.history
            .slice(self.trend_window.range(self.history.len()))
    }

    #[must_use]
    pub fn chart_service(&self) -> &ChartService {
        &self.chart_service
    }

    /// Draw the current chart onto `surface`.
    ///
    /// Failures never reach the caller: the frame is dropped (and logged when
    /// the policy says so) and `false` is returned.
    pub fn draw_chart(&self, surface: &mut dyn ChartSurface) -> bool {
        let valuation = self.valuation();
        let visible = self.visible_history();
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.chart_service
                .draw(surface, self.view_mode, &valuation, &visible)
        }));

        let error = match result {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e,
            Err(_) => CoreError::Render("drawing panicked".into()),
        };
        if self.chart_service.options().render_errors == RenderErrorPolicy::Log {
            log::error!("Chart frame dropped: {error}");
        }
        false
    }

    // ── Persistence ─────────────────────────────────────────────────

    #[must_use]
    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Write the ledger now. No-op for in-memory trackers.
    pub fn save(&self) -> Result<(), CoreError> {
        match &self.data_file {
            Some(path) => StorageManager::save_to_file(&self.ledger, path),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: Settings, ledger: Ledger) -> Self {
        let provider: Arc<dyn QuoteProvider> = Arc::new(YahooFinanceProvider::from_settings(&settings));
        Self {
            history: HistoryRecorder::new(settings.history_max_len),
            trend_window: TrendWindow::new(settings.visible_points),
            chart_service: ChartService::new(settings.chart.clone()),
            view_mode: ChartViewMode::default(),
            ledger_service: LedgerService::new(),
            valuation_service: ValuationService::new(),
            price_service: PriceService::new(),
            provider,
            host: None,
            data_file: None,
            ledger,
            settings,
        }
    }

    fn after_mutation(&mut self) {
        let valuation = self.valuation();
        if let Some(host) = self.host.as_mut() {
            host.on_portfolio_changed(&valuation);
            host.request_repaint();
        }
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Could not save portfolio: {e}");
        }
    }

    fn notify(&mut self, message: &str) {
        log::info!("{message}");
        if let Some(host) = self.host.as_mut() {
            host.notify(message);
        }
    }

    fn request_repaint(&mut self) {
        if let Some(host) = self.host.as_mut() {
            host.request_repaint();
        }
    }
}
