use chrono::Utc;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;

use super::format::{self, LoadedDocument};

/// High-level storage operations: save/load the ledger to/from the JSON file.
///
/// No atomic replace and no locking; the last writer wins.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a ledger to the document text, stamped with the current time.
    pub fn save_to_string(ledger: &Ledger) -> Result<String, CoreError> {
        format::write_document(ledger, Utc::now())
    }

    /// Parse document text. See [`format::read_document`] for the coercion rules.
    pub fn load_from_str(text: &str) -> Result<LoadedDocument, CoreError> {
        format::read_document(text, Utc::now().date_naive())
    }

    /// Write the ledger to `path`, creating the parent directory if needed.
    pub fn save_to_file(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
        let text = Self::save_to_string(ledger)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        log::debug!("Saved {} holdings to {}", ledger.len(), path.display());
        Ok(())
    }

    /// Read and parse `path`, reporting why it could not be used.
    pub fn try_load_from_file(path: &Path) -> Result<LoadedDocument, CoreError> {
        let text = std::fs::read_to_string(path)?;
        Self::load_from_str(&text)
    }

    /// Load the ledger from `path`. Never fails.
    ///
    /// A missing file is a fresh, empty portfolio. An empty, unparsable or
    /// wrongly-shaped file is logged and also yields an empty ledger.
    pub fn load_from_file(path: &Path) -> Ledger {
        if !path.exists() {
            log::info!("No portfolio at {}, starting empty", path.display());
            return Ledger::new();
        }
        match Self::try_load_from_file(path) {
            Ok(doc) => {
                log::info!(
                    "Loaded {} holdings from {}",
                    doc.ledger.len(),
                    path.display()
                );
                doc.ledger
            }
            Err(e) => {
                log::error!("Could not load {}: {e}", path.display());
                Ledger::new()
            }
        }
    }
}
