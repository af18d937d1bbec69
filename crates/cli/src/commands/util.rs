use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sweep_core::db::{WorkspaceContext, WorkspaceLayout};

use crate::canonicalize_or_current;

/// Resolve `root` and load the workspace config and database (delegates to core helper).
pub fn open_workspace(root: &str) -> Result<WorkspaceContext> {
    let root_path = canonicalize_or_current(root)?;
    WorkspaceContext::from_root(&root_path)
}

/// Layout for `root` without touching the filesystem.
pub fn workspace_layout(root: &str) -> Result<WorkspaceLayout> {
    Ok(WorkspaceLayout::new(canonicalize_or_current(root)?))
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Split a `--accounts` value into names/ids. Blank entries are dropped.
pub fn parse_account_selection(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
    })
    .unwrap_or_default()
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", serialized);
    Ok(())
}
