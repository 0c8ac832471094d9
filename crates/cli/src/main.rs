mod cli;
mod console;
mod main_lib;
mod svg;

use clap::Parser;
use std::time::Duration;

use cli::{Cli, Command};
use console::ConsoleHost;
use main_lib::{init_tracing, load_settings, EditInput};
use panel_portfolio_core::PortfolioTracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let settings = load_settings(&cli.global)?;

    if let Command::Workspaces {
        terms,
        max,
        suffix,
        open,
        exe,
    } = cli.command
    {
        return main_lib::workspaces(&terms, max, suffix, open, exe);
    }

    let refresh_every = Duration::from_secs(settings.refresh_interval_secs.max(1));
    let mut tracker = PortfolioTracker::open(settings).with_host(Box::new(ConsoleHost));

    match cli.command {
        Command::Config => main_lib::print_config(&tracker)?,
        Command::List => main_lib::list(&tracker),
        Command::Add {
            symbol,
            quantity,
            price,
        } => main_lib::add(&mut tracker, &symbol, &quantity, price.as_deref()).await?,
        Command::Edit {
            index,
            quantity,
            purchase_price,
            current_price,
            date,
            color,
        } => main_lib::edit(
            &mut tracker,
            index,
            EditInput {
                quantity: quantity.as_deref(),
                purchase_price: purchase_price.as_deref(),
                current_price: current_price.as_deref(),
                date: date.as_deref(),
                color: color.as_deref(),
            },
        )?,
        Command::Remove { index } => {
            tracker.remove_holding(index)?;
        }
        Command::Refresh => main_lib::refresh(&mut tracker).await,
        Command::Quote { symbol } => main_lib::quote(&tracker, &symbol).await?,
        Command::Suggest { query } => main_lib::suggest(&tracker, &query).await,
        Command::Chart {
            mode,
            out,
            width,
            height,
        } => {
            tracker.set_view_mode(mode.into());
            main_lib::write_chart(&tracker, &out, width, height)?;
        }
        Command::Watch {
            interval,
            ticks,
            out,
            mode,
        } => {
            let every = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(refresh_every);
            main_lib::watch(tracker, mode.into(), every, ticks, &out).await?;
        }
        Command::Workspaces { .. } => unreachable!("workspaces returns before the tracker opens"),
    }
    Ok(())
}
