// ═══════════════════════════════════════════════════════════════════
// Workspace Tests: storage lookup, index, search, launch commands
// ═══════════════════════════════════════════════════════════════════

use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

use editor_workspaces::errors::WorkspaceError;
use editor_workspaces::index::{filter_results, suffix_for, Workspace, WorkspaceIndex};
use editor_workspaces::launch::launch_command;
use editor_workspaces::locator::{StorageLocator, APP_DIRS};
use editor_workspaces::WorkspaceSearch;

fn storage() -> serde_json::Value {
    json!({
        "profileAssociations": {
            "workspaces": {
                "file:///home/me/projects/panel": "__default__profile__",
                "file:///home/me/work/team.code-workspace": "__default__profile__",
                "file:///home/me/My%20Notes": "__default__profile__",
                "vscode-remote://dev-container%2B7b22/workspaces/app": "__default__profile__",
                "vscode-remote://ssh-remote%2Bbox/srv/api": "__default__profile__",
                "vscode-remote://codespaces%2Bfuzzy/workspaces/site": "__default__profile__",
                "vscode-vfs://github/me/dotfiles": "__default__profile__"
            }
        }
    })
}

fn write_storage(root: &Path, app: &str, content: &str) {
    let dir = root.join(app).join("User").join("globalStorage");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("storage.json"), content).unwrap();
}

fn by_name<'a>(index: &'a WorkspaceIndex, name: &str) -> &'a Workspace {
    index.iter().find(|w| w.name == name).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Index
// ═══════════════════════════════════════════════════════════════════

mod index {
    use super::*;

    #[test]
    fn skips_dev_containers() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();
        assert_eq!(index.len(), 6);
        assert!(index.iter().all(|w| !w.path.contains("dev-container")));
    }

    #[test]
    fn names_and_paths() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();

        let team = by_name(&index, "team Workspace");
        assert_eq!(team.path, "/home/me/work/team.code-workspace");

        let notes = by_name(&index, "My Notes");
        assert_eq!(notes.path, "/home/me/My Notes", "percent-decoded");

        let api = by_name(&index, "api");
        assert_eq!(api.path, "vscode-remote://ssh-remote+box/srv/api");
        assert!(api.is_remote());
        assert!(!notes.is_remote());
    }

    #[test]
    fn sorted_by_raw_uri_with_unique_ids() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();
        let paths: Vec<&str> = index.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths[0], "/home/me/My Notes");
        assert_eq!(paths[5], "vscode-vfs://github/me/dotfiles");

        let mut ids: Vec<&str> = index.iter().map(|w| w.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn missing_workspaces_object() {
        let err = WorkspaceIndex::from_storage(&json!({"other": 1})).unwrap_err();
        assert!(matches!(err, WorkspaceError::MalformedStorage(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Search
// ═══════════════════════════════════════════════════════════════════

mod search {
    use super::*;

    #[test]
    fn initial_match_is_case_insensitive_on_joined_terms() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();
        let ids = index.initial_results(&["PAN", "el"]);
        assert_eq!(ids.len(), 1);
        assert_eq!(index.get(&ids[0]).unwrap().name, "panel");

        assert_eq!(index.initial_results(&[]).len(), 6);
        assert!(index.initial_results(&["zzz"]).is_empty());
    }

    #[test]
    fn subsearch_narrows_previous() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();
        let first = index.initial_results(&["s"]);
        let narrowed = index.subsearch(&first, &["site"]);
        assert_eq!(narrowed.len(), 1);
        assert!(first.contains(&narrowed[0]));

        let stale = vec!["not-an-id".to_string()];
        assert!(index.subsearch(&stale, &[]).is_empty());
    }

    #[test]
    fn filter_results_truncates() {
        let ids: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(filter_results(&ids, 3), vec!["0", "1", "2"]);
        assert_eq!(filter_results(&ids, 50).len(), 10);
    }

    #[test]
    fn metas_with_and_without_suffix() {
        let index = WorkspaceIndex::from_storage(&storage()).unwrap();
        let site = by_name(&index, "site").id.clone();
        let dotfiles = by_name(&index, "dotfiles").id.clone();
        let ids = vec![site, dotfiles];

        let plain = index.result_metas(&ids, false);
        assert_eq!(plain[0].name, "site");

        let labelled = index.result_metas(&ids, true);
        assert_eq!(labelled[0].name, "site [Codespaces]");
        assert_eq!(labelled[1].name, "dotfiles [Github]");
        assert_eq!(labelled[1].description, "vscode-vfs://github/me/dotfiles");
    }

    #[test]
    fn suffix_prefixes() {
        assert_eq!(suffix_for("vscode-remote://codespaces+x/a"), Some("[Codespaces]"));
        assert_eq!(suffix_for("vscode-remote://wsl+Ubuntu/a"), Some("[Remote]"));
        assert_eq!(suffix_for("vscode-vfs://github/a/b"), Some("[Github]"));
        assert_eq!(suffix_for("/home/me/a"), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Launch
// ═══════════════════════════════════════════════════════════════════

mod launch {
    use super::*;

    #[test]
    fn local_path_is_a_plain_argument() {
        let w = Workspace::from_uri("file:///home/me/projects/panel");
        let cmd = launch_command("code", &w);
        assert_eq!(cmd.program, "code");
        assert_eq!(cmd.args, vec!["/home/me/projects/panel"]);
    }

    #[test]
    fn remote_folder_and_file() {
        let folder = Workspace::from_uri("vscode-remote://ssh-remote+box/srv/api");
        assert_eq!(
            launch_command("codium", &folder).args,
            vec!["--folder-uri", "vscode-remote://ssh-remote+box/srv/api"]
        );

        let file = Workspace::from_uri("vscode-remote://ssh-remote+box/srv/all.code-workspace");
        assert_eq!(launch_command("codium", &file).args[0], "--file-uri");
    }

    #[test]
    fn leading_dot_alone_is_a_folder() {
        let w = Workspace::from_uri("vscode-vfs://github/me/.config");
        assert_eq!(launch_command("code", &w).args[0], "--folder-uri");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Locator + WorkspaceSearch
// ═══════════════════════════════════════════════════════════════════

mod locator {
    use super::*;

    #[test]
    fn candidates_cover_every_root_and_app() {
        let locator = StorageLocator::new(vec!["/a".into(), "/b".into()]);
        let candidates = locator.candidates();
        assert_eq!(candidates.len(), 2 * APP_DIRS.len());
        assert_eq!(
            candidates[0],
            Path::new("/a/Code/User/globalStorage/storage.json")
        );
    }

    #[test]
    fn first_readable_file_wins() {
        let config = TempDir::new().unwrap();
        write_storage(config.path(), "Code", "");
        write_storage(config.path(), "VSCodium", &storage().to_string());

        let locator = StorageLocator::new(vec![config.path().to_path_buf()]);
        let (path, value) = locator.read().unwrap();
        assert!(path.ends_with("VSCodium/User/globalStorage/storage.json"));
        assert!(value.get("profileAssociations").is_some());
    }

    #[test]
    fn nothing_found() {
        let empty = TempDir::new().unwrap();
        let err = StorageLocator::new(vec![empty.path().to_path_buf()])
            .read()
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::StorageNotFound { tried: 6 }));
    }

    #[test]
    fn search_reloads_and_resolves_ids() {
        let config = TempDir::new().unwrap();
        write_storage(config.path(), "Code", &storage().to_string());

        let mut search =
            WorkspaceSearch::new(StorageLocator::new(vec![config.path().to_path_buf()]))
                .with_suffix(true);
        let ids = search.initial_results(&["api"]);
        let ids = search.filter_results(&ids, 5);
        let metas = search.result_metas(&ids);
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].name, "api [Remote]");
        assert!(search.storage_path().is_some());

        let err = search.activate("missing", "code").unwrap_err();
        assert!(matches!(err, WorkspaceError::UnknownId(_)));
    }

    #[test]
    fn search_without_storage_is_empty() {
        let empty = TempDir::new().unwrap();
        let mut search = WorkspaceSearch::new(StorageLocator::new(vec![empty.path().to_path_buf()]));
        assert!(search.initial_results(&["x"]).is_empty());
        assert!(search.index().is_empty());
    }
}
