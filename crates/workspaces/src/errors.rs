use thiserror::Error;

/// Errors raised while locating, indexing or opening editor workspaces.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("No readable editor storage.json found (tried {tried} locations)")]
    StorageNotFound { tried: usize },

    #[error("Malformed editor storage: {0}")]
    MalformedStorage(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Lookup / Launch ─────────────────────────────────────────────
    #[error("Unknown workspace id: {0}")]
    UnknownId(String),

    #[error("Could not launch editor: {0}")]
    Launch(String),
}

impl From<std::io::Error> for WorkspaceError {
    fn from(e: std::io::Error) -> Self {
        WorkspaceError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for WorkspaceError {
    fn from(e: serde_json::Error) -> Self {
        WorkspaceError::MalformedStorage(e.to_string())
    }
}
