use chrono::{NaiveDate, Utc};

use crate::errors::CoreError;
use crate::models::color::{palette_color, Rgba};
use crate::models::holding::{Holding, HoldingDraft, HoldingEdit};
use crate::models::ledger::Ledger;

/// What `add_holding` did with a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new holding was appended at this index
    Inserted(usize),
    /// The draft was merged into the existing holding at this index
    Merged(usize),
}

impl AddOutcome {
    pub fn index(self) -> usize {
        match self {
            AddOutcome::Inserted(i) | AddOutcome::Merged(i) => i,
        }
    }
}

/// Mutates the ledger: add (with merge), staged edit, delete, price updates.
///
/// Pure business logic: no I/O, no API calls.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Add a holding, or merge it into the existing one with the same symbol.
    ///
    /// Merging sums the quantities and sets the purchase price to the
    /// quantity-weighted average of both cost bases. The newer current price
    /// wins.
    pub fn add_holding(
        &self,
        ledger: &mut Ledger,
        draft: HoldingDraft,
    ) -> Result<AddOutcome, CoreError> {
        let symbol = draft.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        let purchase_price = draft.effective_purchase_price();
        Self::validate_quantity(draft.quantity)?;
        Self::validate_purchase_price(purchase_price)?;
        Self::validate_current_price(draft.current_price)?;
        if let Some(color) = &draft.color {
            Self::validate_color(color)?;
        }

        if let Some(idx) = ledger.position_of(&symbol) {
            let existing = &mut ledger.holdings[idx];
            let total_quantity = existing.quantity + draft.quantity;
            existing.purchase_price = (existing.quantity * existing.purchase_price
                + draft.quantity * purchase_price)
                / total_quantity;
            existing.quantity = total_quantity;
            existing.current_price = draft.current_price;
            if existing.name.is_none() {
                existing.name = draft.name;
            }
            return Ok(AddOutcome::Merged(idx));
        }

        let idx = ledger.len();
        let color = draft
            .color
            .unwrap_or_else(|| palette_color(idx).to_string());
        ledger.holdings.push(Holding {
            symbol,
            name: draft.name,
            quantity: draft.quantity,
            purchase_price,
            current_price: draft.current_price,
            purchase_date: draft.purchase_date.unwrap_or_else(today),
            color,
        });
        Ok(AddOutcome::Inserted(idx))
    }

    /// Apply a staged edit to the holding at `index`.
    ///
    /// The edited holding is validated as a whole before it replaces the
    /// original; on error the ledger is untouched.
    pub fn edit_holding(
        &self,
        ledger: &mut Ledger,
        index: usize,
        edit: HoldingEdit,
    ) -> Result<(), CoreError> {
        let len = ledger.len();
        let current = ledger
            .holdings
            .get(index)
            .ok_or(CoreError::HoldingNotFound { index, len })?;

        let mut updated = current.clone();
        if let Some(quantity) = edit.quantity {
            updated.quantity = quantity;
        }
        if let Some(price) = edit.purchase_price {
            updated.purchase_price = price;
        }
        if let Some(price) = edit.current_price {
            updated.current_price = price;
        }
        if let Some(date) = edit.purchase_date {
            updated.purchase_date = date;
        }
        if let Some(color) = edit.color {
            updated.color = color;
        }

        Self::validate_quantity(updated.quantity)?;
        Self::validate_purchase_price(updated.purchase_price)?;
        Self::validate_current_price(updated.current_price)?;
        Self::validate_color(&updated.color)?;

        ledger.holdings[index] = updated;
        Ok(())
    }

    /// Remove and return the holding at `index`. Later holdings shift down.
    pub fn remove_holding(&self, ledger: &mut Ledger, index: usize) -> Result<Holding, CoreError> {
        let len = ledger.len();
        if index >= len {
            return Err(CoreError::HoldingNotFound { index, len });
        }
        Ok(ledger.holdings.remove(index))
    }

    /// Set the market price of every holding with this symbol.
    /// Returns `false` when the symbol is not in the ledger or the price is unusable.
    pub fn update_price(&self, ledger: &mut Ledger, symbol: &str, price: f64) -> bool {
        if !price.is_finite() || price <= 0.0 {
            return false;
        }
        match ledger.position_of(symbol) {
            Some(idx) => {
                ledger.holdings[idx].current_price = price;
                true
            }
            None => false,
        }
    }

    fn validate_quantity(quantity: f64) -> Result<(), CoreError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }
        Ok(())
    }

    fn validate_purchase_price(price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Purchase price must be positive, got {price}"
            )));
        }
        Ok(())
    }

    fn validate_current_price(price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Current price must be positive, got {price}"
            )));
        }
        Ok(())
    }

    fn validate_color(color: &str) -> Result<(), CoreError> {
        if Rgba::from_hex(color).is_none() {
            return Err(CoreError::Validation(format!(
                "Colour must be a hex value like #4ECDC4, got {color:?}"
            )));
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
