use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// The ordered list of holdings. Position in the list is the only key;
/// there is no stable id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    pub holdings: Vec<Holding>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Holding> {
        self.holdings.get(index)
    }

    /// Position of `symbol` (case-insensitive).
    pub fn position_of(&self, symbol: &str) -> Option<usize> {
        let upper = symbol.trim().to_uppercase();
        self.holdings.iter().position(|h| h.symbol == upper)
    }

    /// Symbols in ledger order.
    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.holdings.iter()
    }
}
