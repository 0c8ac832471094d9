pub mod chart_service;
pub mod history_service;
pub mod ledger_service;
pub mod price_service;
pub mod suggestion_service;
pub mod valuation_service;
