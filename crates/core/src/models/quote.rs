use serde::{Deserialize, Serialize};

/// A resolved market quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Short name, or the symbol when the endpoint has none
    pub name: String,
}

/// A ticker suggestion for a partial query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub quote_type: String,
}
