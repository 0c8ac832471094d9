use panel_portfolio_core::host::PanelHost;
use panel_portfolio_core::models::analytics::PortfolioValuation;

/// Panel host for a terminal: changes and notifications go to stdout.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl PanelHost for ConsoleHost {
    fn on_portfolio_changed(&mut self, valuation: &PortfolioValuation) {
        println!("{}", summary_line(valuation));
    }

    fn request_repaint(&mut self) {
        tracing::debug!("Repaint requested");
    }

    fn notify(&mut self, message: &str) {
        println!("» {message}");
    }
}

/// One-line totals, as shown in the panel button.
pub fn summary_line(v: &PortfolioValuation) -> String {
    format!(
        "Total {:.2} | Invested {:.2} | P/L {:+.2} ({:+.2}%)",
        v.total_value, v.total_investment, v.total_profit, v.total_profit_percent
    )
}
