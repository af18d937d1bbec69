use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::db::{AccountEntry, ScanDb, WorkspaceConfig, WorkspaceLayout};

/// Load the workspace config JSON from disk for a given layout.
pub fn load_workspace_config(layout: &WorkspaceLayout) -> Result<WorkspaceConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read workspace config at {}", layout.config_path.display())
    })?;
    let config: WorkspaceConfig =
        serde_json::from_str(&config_json).context("Failed to parse workspace config JSON")?;
    Ok(config)
}

/// Write the workspace config JSON back to disk.
pub fn save_workspace_config(layout: &WorkspaceLayout, config: &WorkspaceConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write workspace config: {}", layout.config_path.display())
    })
}

/// Resolve the DB path (respecting relative/absolute config) and open a ScanDb.
pub fn open_scan_db(layout: &WorkspaceLayout) -> Result<(WorkspaceConfig, PathBuf, ScanDb)> {
    let config = load_workspace_config(layout)?;
    let db_path = layout.resolve(&config.db.path);
    let db = ScanDb::open(&db_path)
        .with_context(|| format!("Failed to open scan database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

/// Resolve the snapshot directory configured for the workspace.
pub fn resolve_data_dir(layout: &WorkspaceLayout, config: &WorkspaceConfig) -> PathBuf {
    layout.resolve(&config.data_dir)
}

#[derive(Debug, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<AccountEntry>,
}

/// Read account entries from a YAML or JSON file (`{accounts: [{id, name, default}]}`).
///
/// The format follows the extension; anything other than `.json` is read as YAML.
pub fn load_accounts_file(path: &Path) -> Result<Vec<AccountEntry>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read accounts file at {}", path.display()))?;
    let parsed: AccountsFile = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse accounts JSON at {}", path.display()))?
    } else {
        serde_yaml::from_str(&body)
            .with_context(|| format!("Failed to parse accounts YAML at {}", path.display()))?
    };
    Ok(parsed.accounts)
}
