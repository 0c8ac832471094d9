use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// File name of the portfolio inside the app directory.
pub const DATA_FILE_NAME: &str = "portfolio.json";

/// Where the portfolio file lives.
///
/// Prefers `<data_dir>/<namespace>` when that directory already exists
/// (an installed copy), otherwise `<config_dir>/<namespace>`. The chosen
/// directory is created. If anything fails, falls back to
/// `<home>/.<namespace>.json`.
pub fn resolve_data_file(namespace: &str) -> PathBuf {
    match try_resolve_data_file(dirs::data_dir(), dirs::config_dir(), namespace) {
        Ok(path) => {
            log::info!("Portfolio file: {}", path.display());
            path
        }
        Err(e) => {
            let fallback = home_fallback(dirs::home_dir(), namespace);
            log::warn!(
                "Could not prepare data directory ({e}); using {}",
                fallback.display()
            );
            fallback
        }
    }
}

/// Directory selection with explicit roots, for callers that already know them.
pub fn try_resolve_data_file(
    data_root: Option<PathBuf>,
    config_root: Option<PathBuf>,
    namespace: &str,
) -> Result<PathBuf, CoreError> {
    let installed = data_root.map(|root| root.join(namespace));
    let dir = match installed {
        Some(dir) if dir.is_dir() => dir,
        _ => config_root
            .map(|root| root.join(namespace))
            .ok_or_else(|| CoreError::DataDir("no config directory for this user".into()))?,
    };
    ensure_dir(&dir)?;
    Ok(dir.join(DATA_FILE_NAME))
}

/// `<home>/.<namespace>.json`, or a relative file when there is no home.
pub fn home_fallback(home: Option<PathBuf>, namespace: &str) -> PathBuf {
    let file = format!(".{namespace}.json");
    match home {
        Some(home) => home.join(file),
        None => PathBuf::from(file),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), CoreError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        log::info!("Created data directory {}", dir.display());
    }
    Ok(())
}
