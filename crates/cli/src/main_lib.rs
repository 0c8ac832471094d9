use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use editor_workspaces::launch::find_editor;
use editor_workspaces::WorkspaceSearch;
use panel_portfolio_core::input::{parse_positive, parse_price, parse_quantity};
use panel_portfolio_core::models::chart::ChartViewMode;
use panel_portfolio_core::models::color::Rgba;
use panel_portfolio_core::models::holding::{HoldingDraft, HoldingEdit};
use panel_portfolio_core::models::settings::Settings;
use panel_portfolio_core::scheduler::{RefreshTimer, SharedTracker};
use panel_portfolio_core::PortfolioTracker;

use crate::cli::GlobalOpts;
use crate::console::summary_line;
use crate::svg::SvgSurface;

/// Text logs by default; `PANEL_PORTFOLIO_LOG_FORMAT=json` switches to JSON lines.
/// `RUST_LOG` sets the filter (default `info`).
pub fn init_tracing() {
    let log_format =
        std::env::var("PANEL_PORTFOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Settings from the optional JSON file, with command-line flags applied on top.
pub fn load_settings(opts: &GlobalOpts) -> anyhow::Result<Settings> {
    let base = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing settings {}", path.display()))?
        }
        None => Settings::default(),
    };
    Ok(opts.apply(base))
}

pub fn print_config(tracker: &PortfolioTracker) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(tracker.settings())?);
    match tracker.data_file() {
        Some(path) => println!("data file: {}", path.display()),
        None => println!("data file: (in memory)"),
    }
    Ok(())
}

pub fn list(tracker: &PortfolioTracker) {
    let valuation = tracker.valuation();
    if valuation.is_empty() {
        println!("No holdings yet. Add one with `panel-portfolio add SYMBOL`.");
        return;
    }
    println!(
        "{:>3}  {:<8} {:>10} {:>10} {:>10} {:>12} {:>9} {:>7}",
        "#", "SYMBOL", "QTY", "COST", "PRICE", "VALUE", "P/L %", "SHARE"
    );
    for (i, (holding, row)) in tracker.holdings().iter().zip(&valuation.holdings).enumerate() {
        println!(
            "{:>3}  {:<8} {:>10.4} {:>10.2} {:>10.2} {:>12.2} {:>+8.2}% {:>6.1}%",
            i,
            holding.symbol,
            holding.quantity,
            holding.purchase_price,
            holding.current_price,
            row.value,
            row.profit_percent,
            row.share_percent
        );
    }
    println!("{}", summary_line(&valuation));
}

pub async fn add(
    tracker: &mut PortfolioTracker,
    symbol: &str,
    quantity: &str,
    price: Option<&str>,
) -> anyhow::Result<()> {
    let quantity = parse_quantity(quantity, 1.0);
    match price.and_then(parse_positive) {
        Some(price) => {
            tracker.add_holding(HoldingDraft::new(symbol, quantity, price))?;
        }
        None => {
            if tracker.add_from_quote(symbol, quantity).await?.is_none() {
                return Err(anyhow!("no quote for {symbol}; pass --price to add it offline"));
            }
        }
    }
    Ok(())
}

/// Values typed for an edit. Unparsable numbers keep the current value.
pub struct EditInput<'a> {
    pub quantity: Option<&'a str>,
    pub purchase_price: Option<&'a str>,
    pub current_price: Option<&'a str>,
    pub date: Option<&'a str>,
    pub color: Option<&'a str>,
}

pub fn edit(tracker: &mut PortfolioTracker, index: usize, input: EditInput<'_>) -> anyhow::Result<()> {
    let holding = tracker
        .holdings()
        .get(index)
        .ok_or_else(|| anyhow!("no holding at index {index}"))?;

    let date = input.date.and_then(|text| {
        let parsed = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok();
        if parsed.is_none() {
            tracing::warn!("Ignoring purchase date '{text}', expected YYYY-MM-DD");
        }
        parsed
    });
    let color = input.color.and_then(|text| {
        if Rgba::from_hex(text).is_some() {
            Some(text.trim().to_string())
        } else {
            tracing::warn!("Ignoring colour '{text}', expected #RRGGBB");
            None
        }
    });

    let staged = HoldingEdit {
        quantity: input.quantity.map(|t| parse_quantity(t, holding.quantity)),
        purchase_price: input
            .purchase_price
            .map(|t| parse_price(t, holding.purchase_price)),
        current_price: input
            .current_price
            .map(|t| parse_price(t, holding.current_price)),
        purchase_date: date,
        color,
    };
    if staged.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    tracker.edit_holding(index, staged)?;
    Ok(())
}

pub async fn refresh(tracker: &mut PortfolioTracker) {
    let report = tracker.refresh_prices().await;
    println!(
        "Refreshed {} of {} holdings",
        report.updated.len(),
        report.requested()
    );
    if !report.failed.is_empty() {
        println!("No quote for: {}", report.failed.join(", "));
    }
}

pub async fn quote(tracker: &PortfolioTracker, symbol: &str) -> anyhow::Result<()> {
    match tracker.lookup_quote(symbol).await? {
        Some(q) => println!("{}  {:.2}  {}", q.symbol, q.price, q.name),
        None => println!("No quote for {}", symbol.trim().to_uppercase()),
    }
    Ok(())
}

pub async fn suggest(tracker: &PortfolioTracker, query: &str) {
    let debouncer = tracker.suggestion_debouncer();
    let Some(list) = debouncer.submit(query).await else {
        return;
    };
    if list.is_empty() {
        println!("No matches for '{query}'");
    }
    for s in list {
        println!("{:<10} {:<8} {}", s.symbol, s.exchange, s.name);
    }
}

/// Draw the current chart into an SVG file. A dropped frame still writes the
/// (empty) canvas.
pub fn write_chart(tracker: &PortfolioTracker, out: &Path, width: f64, height: f64) -> anyhow::Result<()> {
    let mut surface = SvgSurface::new(width, height);
    if !tracker.draw_chart(&mut surface) {
        tracing::warn!("Chart could not be drawn; writing an empty canvas");
    }
    std::fs::write(out, surface.finish())
        .with_context(|| format!("writing chart to {}", out.display()))?;
    tracing::info!("Chart written to {}", out.display());
    Ok(())
}

pub async fn watch(
    tracker: PortfolioTracker,
    mode: ChartViewMode,
    every: Duration,
    ticks: u64,
    out: &Path,
) -> anyhow::Result<()> {
    let shared: SharedTracker = Arc::new(Mutex::new(tracker));
    {
        let mut t = shared.lock().await;
        t.set_view_mode(mode);
        write_chart(&t, out, 400.0, 300.0)?;
    }

    let mut timer = RefreshTimer::start(shared.clone(), every);
    let mut tick_rx = timer.subscribe();
    println!("Refreshing every {}s; Ctrl-C to stop", every.as_secs());

    loop {
        tokio::select! {
            changed = tick_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let completed = *tick_rx.borrow_and_update();
                let t = shared.lock().await;
                write_chart(&t, out, 400.0, 300.0)?;
                println!("[{completed}] {}", summary_line(&t.valuation()));
                if ticks > 0 && completed >= ticks {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
    timer.stop();
    Ok(())
}

pub fn workspaces(
    terms: &[String],
    max: usize,
    suffix: bool,
    open: Option<usize>,
    exe: Option<String>,
) -> anyhow::Result<()> {
    let mut search = WorkspaceSearch::default().with_suffix(suffix);
    let terms: Vec<&str> = terms.iter().map(String::as_str).collect();
    let ids = search.initial_results(&terms);
    let ids = search.filter_results(&ids, max);
    let metas = search.result_metas(&ids);

    if metas.is_empty() {
        println!("No matching workspaces");
    }
    for (i, meta) in metas.iter().enumerate() {
        println!("{:>3}. {}  {}", i + 1, meta.name, meta.description);
    }

    if let Some(n) = open {
        let meta = n
            .checked_sub(1)
            .and_then(|i| metas.get(i))
            .ok_or_else(|| anyhow!("no result #{n}"))?;
        let exe = exe
            .or_else(find_editor)
            .ok_or_else(|| anyhow!("no editor found on PATH; pass --exe"))?;
        search.activate(&meta.id, &exe)?;
    }
    Ok(())
}
