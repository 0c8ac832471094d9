use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::chart::ChartOptions;

/// Application settings. Every field has a default, so partial configs
/// deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory name used under the user data/config directory.
    pub app_namespace: String,

    /// Explicit portfolio file. When `None` the path is resolved from the
    /// namespace (see `storage::paths`).
    pub data_file: Option<PathBuf>,

    /// Scheme and host of the finance API, without trailing slash.
    pub finance_host: String,

    /// Seconds between background price refreshes.
    pub refresh_interval_secs: u64,

    /// Maximum number of history snapshots kept.
    pub history_max_len: usize,

    /// Snapshots shown at once in trend mode.
    pub visible_points: usize,

    /// Quiet period before a suggestions request is sent.
    pub suggestion_debounce_ms: u64,

    /// Maximum suggestions returned per query.
    pub suggestion_limit: usize,

    /// HTTP timeout for quote and suggestion requests.
    pub request_timeout_secs: u64,

    pub chart: ChartOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_namespace: "panel-portfolio".to_string(),
            data_file: None,
            finance_host: "https://query1.finance.yahoo.com".to_string(),
            refresh_interval_secs: 300,
            history_max_len: 100,
            visible_points: 20,
            suggestion_debounce_ms: 300,
            suggestion_limit: 5,
            request_timeout_secs: 30,
            chart: ChartOptions::default(),
        }
    }
}
