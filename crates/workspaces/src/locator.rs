use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::errors::WorkspaceError;

/// Editor config directories, relative to a config root. Stable and insider
/// builds of Code and VSCodium, then the VSCodium flatpaks.
pub const APP_DIRS: [&str; 6] = [
    "Code",
    "Code - Insiders",
    "VSCodium",
    "VSCodium - Insiders",
    "com.vscodium.codium/config/VSCodium",
    "com.vscodium.codium-insiders/config/VSCodium - Insiders",
];

const STORAGE_SUFFIX: &str = "User/globalStorage/storage.json";

/// Finds the editor's `storage.json`.
///
/// Roots are tried in order (the user config dir, then `~/.var/app` for
/// flatpaks), and within each root every entry of [`APP_DIRS`]. The first
/// file that exists and parses wins.
#[derive(Debug, Clone)]
pub struct StorageLocator {
    roots: Vec<PathBuf>,
}

impl StorageLocator {
    /// Locator over explicit roots.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Locator over the current user's config dir and flatpak app dir.
    pub fn for_current_user() -> Self {
        let mut roots = Vec::new();
        if let Some(config) = dirs::config_dir() {
            roots.push(config);
        }
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".var").join("app"));
        }
        Self::new(roots)
    }

    /// Every candidate path, in lookup order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.roots
            .iter()
            .flat_map(|root| APP_DIRS.iter().map(move |app| root.join(app).join(STORAGE_SUFFIX)))
            .collect()
    }

    /// Parsed contents of the first usable `storage.json`.
    pub fn read(&self) -> Result<(PathBuf, Value), WorkspaceError> {
        let candidates = self.candidates();
        for path in &candidates {
            if !path.is_file() {
                continue;
            }
            match read_json(path) {
                Ok(value) => {
                    log::debug!("Using editor storage {}", path.display());
                    return Ok((path.clone(), value));
                }
                Err(e) => log::warn!("Skipping {}: {e}", path.display()),
            }
        }
        Err(WorkspaceError::StorageNotFound {
            tried: candidates.len(),
        })
    }
}

impl Default for StorageLocator {
    fn default() -> Self {
        Self::for_current_user()
    }
}

fn read_json(path: &Path) -> Result<Value, WorkspaceError> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(WorkspaceError::MalformedStorage("file is empty".into()));
    }
    Ok(serde_json::from_str(&text)?)
}
