use std::process::{Child, Command};

use crate::errors::WorkspaceError;
use crate::index::Workspace;

/// Editor executables to try, in order, when none is configured.
pub const EDITOR_CANDIDATES: [&str; 7] = [
    "code",
    "code-insiders",
    "code-oss",
    "codium",
    "codium-insiders",
    "com.vscodium.codium",
    "com.vscodium.codium-insiders",
];

/// First of [`EDITOR_CANDIDATES`] found on `PATH`.
pub fn find_editor() -> Option<String> {
    let path = std::env::var_os("PATH")?;
    let dirs: Vec<_> = std::env::split_paths(&path).collect();
    let found = EDITOR_CANDIDATES
        .iter()
        .find(|name| dirs.iter().any(|dir| dir.join(name).is_file()))
        .map(|name| name.to_string());
    if found.is_none() {
        log::error!("No code editor executable found on PATH");
    }
    found
}

/// A program plus arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn spawn(&self) -> Result<Child, WorkspaceError> {
        Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(|e| WorkspaceError::Launch(format!("{}: {e}", self.program)))
    }
}

/// Command line that opens `workspace` in `executable`.
///
/// Remote and virtual paths are passed as `--file-uri` when the last segment
/// has a dot after its first character (a `.code-workspace` file), otherwise
/// as `--folder-uri`. Local paths are passed as-is.
pub fn launch_command(executable: &str, workspace: &Workspace) -> LaunchCommand {
    let path = workspace.path.clone();
    let args = if workspace.is_remote() {
        let last = path.rsplit('/').next().unwrap_or_default();
        let is_file = last.chars().skip(1).any(|c| c == '.');
        let flag = if is_file { "--file-uri" } else { "--folder-uri" };
        vec![flag.to_string(), path]
    } else {
        vec![path]
    };
    LaunchCommand {
        program: executable.to_string(),
        args,
    }
}

/// Open `workspace` in `executable` without waiting for it.
pub fn activate(executable: &str, workspace: &Workspace) -> Result<Child, WorkspaceError> {
    let command = launch_command(executable, workspace);
    log::info!("Opening {} with {}", workspace.path, command.program);
    command.spawn()
}
