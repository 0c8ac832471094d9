use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::WorkspaceError;

const DEV_CONTAINER_PREFIX: &str = "vscode-remote://dev-container";

/// Labels appended to result names, checked in order.
const SUFFIXES: [(&str, &str); 3] = [
    ("vscode-remote://codespaces", "[Codespaces]"),
    ("vscode-remote://", "[Remote]"),
    ("vscode-vfs://github", "[Github]"),
];

/// A recently opened folder or `.code-workspace` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Per-load id; not stable across reloads
    pub id: String,
    pub name: String,
    /// Local path, or the full URI for remote and virtual workspaces
    pub path: String,
}

impl Workspace {
    /// Build an entry from a (percent-decoded) workspace URI.
    pub fn from_uri(uri: &str) -> Self {
        let last = uri.rsplit('/').next().unwrap_or(uri);
        Self {
            id: Uuid::new_v4().to_string(),
            name: last.replacen(".code-workspace", " Workspace", 1),
            path: uri.replacen("file://", "", 1),
        }
    }

    /// Remote or virtual-filesystem workspace that needs a URI flag to open.
    pub fn is_remote(&self) -> bool {
        self.path.starts_with("vscode-remote://") || self.path.starts_with("vscode-vfs://")
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// What a search result shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMeta {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// All known workspaces, sorted by URI.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceIndex {
    entries: Vec<Workspace>,
}

impl WorkspaceIndex {
    /// Read `profileAssociations.workspaces` from parsed `storage.json`.
    ///
    /// Keys are sorted, then percent-decoded. Dev-container workspaces are
    /// left out.
    pub fn from_storage(storage: &Value) -> Result<Self, WorkspaceError> {
        let workspaces = storage
            .get("profileAssociations")
            .and_then(|p| p.get("workspaces"))
            .and_then(Value::as_object)
            .ok_or_else(|| {
                WorkspaceError::MalformedStorage("no profileAssociations.workspaces object".into())
            })?;

        let mut keys: Vec<&String> = workspaces.keys().collect();
        keys.sort();

        let entries = keys
            .into_iter()
            .map(|key| match urlencoding::decode(key) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => {
                    log::warn!("Workspace URI is not valid UTF-8 once decoded: {key}");
                    key.clone()
                }
            })
            .filter(|uri| !uri.starts_with(DEV_CONTAINER_PREFIX))
            .map(|uri| Workspace::from_uri(&uri))
            .collect::<Vec<_>>();

        log::debug!("Indexed {} editor workspaces", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workspace> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.entries.iter().find(|w| w.id == id)
    }

    /// Ids whose name contains the joined, lowercased terms.
    pub fn initial_results(&self, terms: &[&str]) -> Vec<String> {
        let needle = search_term(terms);
        self.entries
            .iter()
            .filter(|w| w.matches(&needle))
            .map(|w| w.id.clone())
            .collect()
    }

    /// Narrow `previous` to ids still matching `terms`. Unknown ids drop out.
    pub fn subsearch(&self, previous: &[String], terms: &[&str]) -> Vec<String> {
        let needle = search_term(terms);
        previous
            .iter()
            .filter(|id| self.get(id).is_some_and(|w| w.matches(&needle)))
            .cloned()
            .collect()
    }

    /// Display data for `ids`, skipping unknown ones.
    pub fn result_metas(&self, ids: &[String], with_suffix: bool) -> Vec<ResultMeta> {
        ids.iter()
            .filter_map(|id| self.get(id))
            .map(|w| {
                let name = match suffix_for(&w.path).filter(|_| with_suffix) {
                    Some(label) => format!("{} {label}", w.name),
                    None => w.name.clone(),
                };
                ResultMeta {
                    id: w.id.clone(),
                    name,
                    description: w.path.clone(),
                }
            })
            .collect()
    }
}

/// First `max` results.
pub fn filter_results(results: &[String], max: usize) -> Vec<String> {
    results.iter().take(max).cloned().collect()
}

/// Label for remote and virtual workspaces.
pub fn suffix_for(path: &str) -> Option<&'static str> {
    SUFFIXES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, label)| *label)
}

fn search_term(terms: &[&str]) -> String {
    terms.concat().to_lowercase()
}
