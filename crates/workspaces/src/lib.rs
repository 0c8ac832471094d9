pub mod errors;
pub mod index;
pub mod launch;
pub mod locator;

use std::path::PathBuf;
use std::process::Child;

use errors::WorkspaceError;
use index::{ResultMeta, WorkspaceIndex};
use locator::StorageLocator;

/// Searches recent editor workspaces and opens them.
///
/// Every new search re-reads the editor's storage, so workspaces opened since
/// the last search show up. Ids from an earlier load stop resolving after a
/// reload.
#[derive(Debug)]
pub struct WorkspaceSearch {
    locator: StorageLocator,
    index: WorkspaceIndex,
    storage_path: Option<PathBuf>,
    show_suffix: bool,
}

impl WorkspaceSearch {
    pub fn new(locator: StorageLocator) -> Self {
        Self {
            locator,
            index: WorkspaceIndex::default(),
            storage_path: None,
            show_suffix: false,
        }
    }

    /// Append `[Remote]`/`[Codespaces]`/`[Github]` to result names.
    pub fn with_suffix(mut self, show: bool) -> Self {
        self.show_suffix = show;
        self
    }

    /// Re-read storage. On failure the index is emptied.
    pub fn reload(&mut self) -> Result<(), WorkspaceError> {
        let loaded = self.locator.read().and_then(|(path, storage)| {
            WorkspaceIndex::from_storage(&storage).map(|index| (path, index))
        });
        match loaded {
            Ok((path, index)) => {
                self.storage_path = Some(path);
                self.index = index;
                Ok(())
            }
            Err(e) => {
                self.storage_path = None;
                self.index = WorkspaceIndex::default();
                Err(e)
            }
        }
    }

    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    /// The storage file the index was built from.
    pub fn storage_path(&self) -> Option<&std::path::Path> {
        self.storage_path.as_deref()
    }

    /// Reload, then match `terms`. Missing storage is logged and gives no results.
    pub fn initial_results(&mut self, terms: &[&str]) -> Vec<String> {
        if let Err(e) = self.reload() {
            log::error!("Failed to read editor storage: {e}");
            return Vec::new();
        }
        self.index.initial_results(terms)
    }

    pub fn subsearch(&self, previous: &[String], terms: &[&str]) -> Vec<String> {
        self.index.subsearch(previous, terms)
    }

    pub fn filter_results(&self, results: &[String], max: usize) -> Vec<String> {
        index::filter_results(results, max)
    }

    pub fn result_metas(&self, ids: &[String]) -> Vec<ResultMeta> {
        self.index.result_metas(ids, self.show_suffix)
    }

    /// Open the workspace `id` in `executable`.
    pub fn activate(&self, id: &str, executable: &str) -> Result<Child, WorkspaceError> {
        let workspace = self
            .index
            .get(id)
            .ok_or_else(|| WorkspaceError::UnknownId(id.to_string()))?;
        launch::activate(executable, workspace)
    }
}

impl Default for WorkspaceSearch {
    fn default() -> Self {
        Self::new(StorageLocator::default())
    }
}
