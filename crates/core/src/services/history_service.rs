use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::models::analytics::PortfolioValuation;
use crate::models::chart::Snapshot;

/// Bounded FIFO of valuation snapshots for the trend chart.
///
/// Once more than `max_len` points are held, the oldest are evicted first.
/// No weighting or decimation.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecorder {
    points: VecDeque<Snapshot>,
    max_len: usize,
}

impl HistoryRecorder {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len.min(1024)),
            max_len,
        }
    }

    /// Append a snapshot of `valuation` taken at `timestamp`.
    ///
    /// Returns `false` (and records nothing) when either total is NaN.
    pub fn record(&mut self, valuation: &PortfolioValuation, timestamp: DateTime<Utc>) -> bool {
        let total_value = valuation.total_value;
        let total_profitability_percent = valuation.total_profit_percent;
        if total_value.is_nan() || total_profitability_percent.is_nan() {
            log::debug!("Skipping history snapshot with NaN totals");
            return false;
        }

        self.points.push_back(Snapshot {
            timestamp,
            total_value,
            total_profitability_percent,
        });
        self.truncate();
        true
    }

    /// Change the capacity, evicting the oldest points if it shrank.
    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len;
        self.truncate();
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.points.back()
    }

    /// Oldest-first view of the buffer.
    pub fn points(&self) -> Vec<&Snapshot> {
        self.points.iter().collect()
    }

    /// Oldest-first copy of `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Vec<Snapshot> {
        self.points.range(range).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn truncate(&mut self) {
        while self.points.len() > self.max_len {
            self.points.pop_front();
        }
    }
}
