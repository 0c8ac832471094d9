use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use panel_portfolio_core::models::chart::{ChartStyle, ChartViewMode};
use panel_portfolio_core::models::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "panel-portfolio", version, about = "Track a stock portfolio with live quotes")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// JSON settings file; flags below override it
    #[arg(long, global = true, env = "PANEL_PORTFOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Portfolio file (default: resolved under the user data directory)
    #[arg(long, global = true, env = "PANEL_PORTFOLIO_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Finance API host, e.g. a mirror
    #[arg(long, global = true, env = "PANEL_PORTFOLIO_FINANCE_HOST")]
    pub finance_host: Option<String>,

    /// Maximum number of history snapshots kept
    #[arg(long, global = true)]
    pub history_max: Option<usize>,

    /// Snapshots shown at once in the trend chart
    #[arg(long, global = true)]
    pub visible_points: Option<usize>,

    /// Proportional chart shape
    #[arg(long, global = true, value_enum)]
    pub style: Option<StyleArg>,
}

impl GlobalOpts {
    /// Apply the flags on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(path) = &self.data_file {
            settings.data_file = Some(path.clone());
        }
        if let Some(host) = &self.finance_host {
            settings.finance_host = host.trim_end_matches('/').to_string();
        }
        if let Some(max) = self.history_max {
            settings.history_max_len = max;
        }
        if let Some(points) = self.visible_points {
            settings.visible_points = points;
        }
        if let Some(style) = self.style {
            settings.chart.style = style.into();
        }
        settings
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective settings and data file
    Config,

    /// List holdings with value and profit
    List,

    /// Add a holding (merged into an existing one with the same symbol)
    Add {
        symbol: String,
        /// Units to add; unparsable input counts as 1
        #[arg(short, long, default_value = "1")]
        quantity: String,
        /// Price per unit; looked up live when omitted
        #[arg(short, long)]
        price: Option<String>,
    },

    /// Edit the holding at INDEX (0-based, as shown by `list`)
    Edit {
        index: usize,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        purchase_price: Option<String>,
        #[arg(long)]
        current_price: Option<String>,
        /// Purchase date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Hex colour, #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove the holding at INDEX
    Remove { index: usize },

    /// Fetch current prices for every holding
    Refresh,

    /// Look up a single quote
    Quote { symbol: String },

    /// Ticker suggestions for a partial query
    Suggest { query: String },

    /// Render the chart to an SVG file
    Chart {
        #[arg(long, value_enum, default_value_t = ModeArg::Proportional)]
        mode: ModeArg,
        #[arg(short, long, default_value = "portfolio.svg")]
        out: PathBuf,
        #[arg(long, default_value_t = 400.0)]
        width: f64,
        #[arg(long, default_value_t = 300.0)]
        height: f64,
    },

    /// Refresh on a timer and re-render the chart after every tick
    Watch {
        /// Seconds between refreshes (default from settings)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many ticks; 0 runs until Ctrl-C
        #[arg(long, default_value_t = 0)]
        ticks: u64,
        #[arg(short, long, default_value = "portfolio.svg")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ModeArg::Trend)]
        mode: ModeArg,
    },

    /// Search recent editor workspaces
    Workspaces {
        terms: Vec<String>,
        #[arg(long, default_value_t = 10)]
        max: usize,
        /// Label remote and virtual workspaces
        #[arg(long)]
        suffix: bool,
        /// Open the Nth listed result (1-based)
        #[arg(long)]
        open: Option<usize>,
        /// Editor executable (default: first one found on PATH)
        #[arg(long)]
        exe: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Proportional,
    Trend,
}

impl From<ModeArg> for ChartViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Proportional => ChartViewMode::Proportional,
            ModeArg::Trend => ChartViewMode::Trend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Pie,
    Donut,
}

impl From<StyleArg> for ChartStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Pie => ChartStyle::Pie,
            StyleArg::Donut => ChartStyle::Donut,
        }
    }
}
