//! Background price refresh on a fixed interval.
//!
//! The timer is the only background task. Each tick snapshots the symbols,
//! releases the tracker, fetches every quote concurrently and then applies the
//! whole batch in one locked step.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::services::price_service::{PriceService, RefreshReport};
use crate::PortfolioTracker;

/// A tracker shared between the host and the refresh timer.
pub type SharedTracker = Arc<Mutex<PortfolioTracker>>;

/// Handle to the periodic refresh task. Stopping or dropping it cancels the task.
pub struct RefreshTimer {
    handle: Option<JoinHandle<()>>,
    ticks: watch::Receiver<u64>,
}

impl RefreshTimer {
    /// Spawn the refresh loop. The first refresh runs one `every` after start.
    pub fn start(tracker: SharedTracker, every: Duration) -> Self {
        let (tx, rx) = watch::channel(0u64);
        let handle = tokio::spawn(async move {
            log::info!("Price refresh timer started ({}s interval)", every.as_secs());
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately; the ledger was just loaded
            ticker.tick().await;

            let mut completed = 0u64;
            loop {
                ticker.tick().await;
                let report = Self::run_refresh(&tracker).await;
                log::info!(
                    "Refresh tick: {} updated, {} failed",
                    report.updated.len(),
                    report.failed.len()
                );
                completed += 1;
                if tx.send(completed).is_err() {
                    log::debug!("No tick subscribers left");
                }
            }
        });
        Self {
            handle: Some(handle),
            ticks: rx,
        }
    }

    /// One refresh round against a shared tracker.
    ///
    /// The lock is not held while quotes are in flight.
    pub async fn run_refresh(tracker: &SharedTracker) -> RefreshReport {
        let (provider, symbols) = {
            let guard = tracker.lock().await;
            (guard.provider(), guard.symbols())
        };
        let outcomes = PriceService::new()
            .fetch_all(provider.as_ref(), &symbols)
            .await;
        tracker.lock().await.apply_quotes(outcomes)
    }

    /// Receiver that changes after every completed tick (value = tick count).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ticks.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::info!("Price refresh timer stopped");
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
