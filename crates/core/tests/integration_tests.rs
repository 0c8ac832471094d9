// ═══════════════════════════════════════════════════════════════════
// Integration Tests: PortfolioTracker facade, RefreshTimer
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use panel_portfolio_core::errors::CoreError;
use panel_portfolio_core::host::{ChartSurface, PanelHost};
use panel_portfolio_core::models::analytics::PortfolioValuation;
use panel_portfolio_core::models::chart::{ChartOptions, ChartViewMode, RenderErrorPolicy};
use panel_portfolio_core::models::color::Rgba;
use panel_portfolio_core::models::holding::{HoldingDraft, HoldingEdit};
use panel_portfolio_core::models::quote::{Quote, Suggestion};
use panel_portfolio_core::models::settings::Settings;
use panel_portfolio_core::providers::traits::QuoteProvider;
use panel_portfolio_core::scheduler::RefreshTimer;
use panel_portfolio_core::services::ledger_service::AddOutcome;
use panel_portfolio_core::storage::manager::StorageManager;
use panel_portfolio_core::PortfolioTracker;

// ═══════════════════════════════════════════════════════════════════
// Test doubles
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    prices: Mutex<HashMap<String, f64>>,
}

impl MockQuoteProvider {
    fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), 175.0);
        prices.insert("TSLA".to_string(), 250.0);
        Self {
            prices: Mutex::new(prices),
        }
    }

    fn set_price(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        let price = self.prices.lock().unwrap().get(&symbol).copied();
        Ok(price.map(|price| Quote {
            name: format!("{symbol} Inc."),
            symbol,
            price,
        }))
    }

    async fn suggest(&self, _query: &str) -> Vec<Suggestion> {
        Vec::new()
    }
}

#[derive(Default)]
struct HostLog {
    changes: Vec<f64>,
    repaints: usize,
    messages: Vec<String>,
}

struct RecordingHost(Arc<Mutex<HostLog>>);

impl PanelHost for RecordingHost {
    fn on_portfolio_changed(&mut self, valuation: &PortfolioValuation) {
        self.0.lock().unwrap().changes.push(valuation.total_value);
    }

    fn request_repaint(&mut self) {
        self.0.lock().unwrap().repaints += 1;
    }

    fn notify(&mut self, message: &str) {
        self.0.lock().unwrap().messages.push(message.to_string());
    }
}

struct NullSurface {
    fail: bool,
    panic: bool,
}

impl ChartSurface for NullSurface {
    fn size(&self) -> (f64, f64) {
        (200.0, 200.0)
    }
    fn set_source_rgba(&mut self, _color: Rgba) {}
    fn set_line_width(&mut self, _width: f64) {}
    fn move_to(&mut self, _x: f64, _y: f64) {}
    fn line_to(&mut self, _x: f64, _y: f64) {}
    fn arc(&mut self, _cx: f64, _cy: f64, _r: f64, _s: f64, _e: f64) {}
    fn arc_negative(&mut self, _cx: f64, _cy: f64, _r: f64, _s: f64, _e: f64) {}
    fn close_path(&mut self) {}
    fn fill(&mut self) -> Result<(), CoreError> {
        if self.panic {
            panic!("backend exploded");
        }
        if self.fail {
            return Err(CoreError::Render("out of memory".into()));
        }
        Ok(())
    }
    fn stroke(&mut self) -> Result<(), CoreError> {
        Ok(())
    }
    fn show_text(&mut self, _x: f64, _y: f64, _text: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

fn tracker_with_host() -> (PortfolioTracker, Arc<Mutex<HostLog>>, Arc<MockQuoteProvider>) {
    let log = Arc::new(Mutex::new(HostLog::default()));
    let provider = Arc::new(MockQuoteProvider::new());
    let tracker = PortfolioTracker::in_memory(Settings::default())
        .with_provider(provider.clone())
        .with_host(Box::new(RecordingHost(log.clone())));
    (tracker, log, provider)
}

// ═══════════════════════════════════════════════════════════════════
// Ledger mutations
// ═══════════════════════════════════════════════════════════════════

mod mutations {
    use super::*;

    #[test]
    fn add_notifies_host_and_repaints() {
        let (mut tracker, log, _) = tracker_with_host();
        tracker
            .add_holding(HoldingDraft::new("AAPL", 10.0, 175.0).with_purchase_price(150.0))
            .unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.changes, vec![1750.0]);
        assert_eq!(log.repaints, 1);
        assert_eq!(log.messages, vec!["Added 10 AAPL".to_string()]);
    }

    #[test]
    fn failed_mutation_changes_nothing() {
        let (mut tracker, log, _) = tracker_with_host();
        assert!(tracker.add_holding(HoldingDraft::new("AAPL", 0.0, 1.0)).is_err());
        assert!(tracker.remove_holding(0).is_err());
        assert!(tracker.holdings().is_empty());
        assert!(log.lock().unwrap().changes.is_empty());
    }

    #[test]
    fn edit_and_remove() {
        let (mut tracker, log, _) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("AAPL", 10.0, 175.0)).unwrap();
        tracker.add_holding(HoldingDraft::new("TSLA", 2.0, 250.0)).unwrap();

        tracker
            .edit_holding(
                1,
                HoldingEdit {
                    quantity: Some(4.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(tracker.holdings()[1].quantity, 4.0);

        let removed = tracker.remove_holding(0).unwrap();
        assert_eq!(removed.symbol, "AAPL");
        assert_eq!(tracker.symbols(), vec!["TSLA".to_string()]);

        let log = log.lock().unwrap();
        assert_eq!(log.changes.len(), 4);
        assert_eq!(log.messages.last().unwrap(), "Removed AAPL");
    }

    #[tokio::test]
    async fn add_from_quote_uses_live_price() {
        let (mut tracker, _, _) = tracker_with_host();
        let outcome = tracker.add_from_quote("aapl", 2.0).await.unwrap();
        assert_eq!(outcome, Some(AddOutcome::Inserted(0)));

        let h = &tracker.holdings()[0];
        assert_eq!(h.current_price, 175.0);
        assert_eq!(h.purchase_price, 175.0);
        assert_eq!(h.name.as_deref(), Some("AAPL Inc."));

        let merged = tracker.add_from_quote("AAPL", 2.0).await.unwrap();
        assert_eq!(merged, Some(AddOutcome::Merged(0)));
        assert_eq!(tracker.holdings()[0].quantity, 4.0);
    }

    #[tokio::test]
    async fn add_from_unknown_quote_adds_nothing() {
        let (mut tracker, log, _) = tracker_with_host();
        assert_eq!(tracker.add_from_quote("ZZZZ", 1.0).await.unwrap(), None);
        assert!(tracker.holdings().is_empty());
        assert_eq!(
            log.lock().unwrap().messages,
            vec!["Asset \"ZZZZ\" not found".to_string()]
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            data_file: Some(dir.path().join("portfolio.json")),
            ..Default::default()
        }
    }

    #[test]
    fn open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let tracker = PortfolioTracker::open(settings_in(&dir));
        let path = tracker.data_file().unwrap().to_path_buf();
        assert!(path.exists());
        assert!(tracker.holdings().is_empty());
    }

    #[test]
    fn mutations_are_persisted_and_reloaded() {
        let dir = TempDir::new().unwrap();
        {
            let mut tracker = PortfolioTracker::open(settings_in(&dir));
            tracker.add_holding(HoldingDraft::new("AAPL", 10.0, 175.0)).unwrap();
            tracker.add_holding(HoldingDraft::new("TSLA", 1.0, 250.0)).unwrap();
            tracker.remove_holding(1).unwrap();
        }
        let reopened = PortfolioTracker::open(settings_in(&dir));
        assert_eq!(reopened.symbols(), vec!["AAPL".to_string()]);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("portfolio.json"), "{{{").unwrap();
        let tracker = PortfolioTracker::open(settings_in(&dir));
        assert!(tracker.holdings().is_empty());
    }

    #[test]
    fn in_memory_save_is_noop() {
        let tracker = PortfolioTracker::in_memory(Settings::default());
        assert!(tracker.data_file().is_none());
        assert!(tracker.save().is_ok());
    }

    #[test]
    fn with_data_file_redirects_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.json");
        let mut tracker =
            PortfolioTracker::in_memory(Settings::default()).with_data_file(path.clone());
        tracker.add_holding(HoldingDraft::new("MSFT", 1.0, 300.0)).unwrap();
        assert_eq!(StorageManager::load_from_file(&path).symbols(), vec!["MSFT".to_string()]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Prices, history and chart state
// ═══════════════════════════════════════════════════════════════════

mod refresh_and_chart {
    use super::*;

    #[tokio::test]
    async fn refresh_updates_prices_and_records_history() {
        let (mut tracker, log, provider) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("AAPL", 10.0, 150.0)).unwrap();
        tracker.add_holding(HoldingDraft::new("GONE", 1.0, 5.0)).unwrap();
        provider.set_price("AAPL", 200.0);

        let report = tracker.refresh_prices().await;
        assert_eq!(report.updated, vec!["AAPL".to_string()]);
        assert_eq!(report.failed, vec!["GONE".to_string()]);
        assert_eq!(tracker.holdings()[0].current_price, 200.0);
        assert_eq!(tracker.holdings()[1].current_price, 5.0);

        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.history().latest().unwrap().total_value, 2005.0);
        assert_eq!(*log.lock().unwrap().changes.last().unwrap(), 2005.0);
    }

    #[tokio::test]
    async fn refresh_without_changes_still_records() {
        let (mut tracker, log, _) = tracker_with_host();
        let report = tracker.refresh_prices().await;
        assert_eq!(report.requested(), 0);
        assert_eq!(tracker.history().len(), 1);
        assert!(log.lock().unwrap().changes.is_empty());
    }

    #[test]
    fn entering_trend_mode_records_snapshot() {
        let (mut tracker, _, _) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("AAPL", 1.0, 100.0)).unwrap();

        tracker.set_view_mode(ChartViewMode::Trend);
        assert_eq!(tracker.view_mode(), ChartViewMode::Trend);
        assert_eq!(tracker.history().len(), 1);

        tracker.set_view_mode(ChartViewMode::Trend);
        assert_eq!(tracker.history().len(), 1, "already in trend mode");

        tracker.set_view_mode(ChartViewMode::Proportional);
        tracker.set_view_mode(ChartViewMode::Trend);
        assert_eq!(tracker.history().len(), 2);
    }

    #[test]
    fn history_is_bounded_by_settings() {
        let settings = Settings {
            history_max_len: 3,
            visible_points: 2,
            ..Default::default()
        };
        let mut tracker = PortfolioTracker::in_memory(settings);
        for minute in 0..6 {
            tracker.record_snapshot_at(Utc.with_ymd_and_hms(2024, 1, 1, 9, minute, 0).unwrap());
        }
        assert_eq!(tracker.history().len(), 3);
        assert_eq!(tracker.visible_history().len(), 2);

        tracker.pan_trend(10);
        assert_eq!(tracker.trend_window().offset, 1);
        let visible = tracker.visible_history();
        assert_eq!(visible[0].timestamp.format("%M").to_string(), "03");
    }

    #[test]
    fn draw_chart_reports_success() {
        let (mut tracker, _, _) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("AAPL", 1.0, 100.0)).unwrap();
        let mut surface = NullSurface {
            fail: false,
            panic: false,
        };
        assert!(tracker.draw_chart(&mut surface));
    }

    #[test]
    fn draw_chart_swallows_errors_and_panics() {
        for policy in [RenderErrorPolicy::Suppress, RenderErrorPolicy::Log] {
            let settings = Settings {
                chart: ChartOptions {
                    render_errors: policy,
                    ..Default::default()
                },
                ..Default::default()
            };
            let mut tracker = PortfolioTracker::in_memory(settings)
                .with_provider(Arc::new(MockQuoteProvider::new()));
            tracker.add_holding(HoldingDraft::new("AAPL", 1.0, 100.0)).unwrap();

            let mut failing = NullSurface {
                fail: true,
                panic: false,
            };
            assert!(!tracker.draw_chart(&mut failing));

            let mut panicking = NullSurface {
                fail: false,
                panic: true,
            };
            assert!(!tracker.draw_chart(&mut panicking));
        }
    }

    #[test]
    fn debug_output_names_provider() {
        let (tracker, _, _) = tracker_with_host();
        let debug = format!("{tracker:?}");
        assert!(debug.contains("PortfolioTracker"));
        assert!(debug.contains("MockProvider"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// RefreshTimer
// ═══════════════════════════════════════════════════════════════════

mod refresh_timer {
    use super::*;

    #[tokio::test]
    async fn run_refresh_applies_batch() {
        let (mut tracker, _, provider) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("TSLA", 1.0, 200.0)).unwrap();
        let shared = Arc::new(tokio::sync::Mutex::new(tracker));

        provider.set_price("TSLA", 260.0);
        let report = RefreshTimer::run_refresh(&shared).await;
        assert!(report.changed());
        assert_eq!(shared.lock().await.holdings()[0].current_price, 260.0);
    }

    #[tokio::test]
    async fn ticks_refresh_until_stopped() {
        let (mut tracker, _, provider) = tracker_with_host();
        tracker.add_holding(HoldingDraft::new("AAPL", 1.0, 100.0)).unwrap();
        provider.set_price("AAPL", 120.0);
        let shared = Arc::new(tokio::sync::Mutex::new(tracker));

        let mut timer = RefreshTimer::start(shared.clone(), Duration::from_millis(20));
        let mut ticks = timer.subscribe();
        assert!(timer.is_running());

        tokio::time::timeout(Duration::from_secs(5), ticks.changed())
            .await
            .expect("a tick within the timeout")
            .unwrap();
        assert_eq!(shared.lock().await.holdings()[0].current_price, 120.0);
        assert!(shared.lock().await.history().len() >= 1);

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }
}
