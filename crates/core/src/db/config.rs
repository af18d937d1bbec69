use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Account;

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the scan-history database file (typically relative to workspace root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// An account known to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub id: String,
    /// Display name; also the directory name under the data dir.
    pub name: String,
    /// Scanned when no accounts are selected explicitly.
    #[serde(default)]
    pub default: bool,
}

impl AccountEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), default: false }
    }

    pub fn to_account(&self) -> Account {
        Account::new(self.id.clone(), self.name.clone())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown account '{0}'")]
    UnknownAccount(String),
    #[error("Account '{0}' is already configured")]
    DuplicateAccount(String),
    #[error("No accounts configured; add one with add-account or import-accounts")]
    NoAccounts,
}

/// Serializable configuration describing a workspace.
///
/// This lives at `.sweep/config.json` in the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Human-friendly workspace name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format.
    pub config_version: String,
    /// Snapshot directory (relative to the workspace root or absolute).
    pub data_dir: String,
    /// Database configuration (path is typically relative to workspace root).
    pub db: DbConfig,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl WorkspaceConfig {
    /// Create a new workspace configuration.
    pub fn new(
        name: impl Into<String>,
        db_path: impl Into<String>,
        data_dir: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            data_dir: data_dir.into(),
            db: DbConfig::new(db_path),
            accounts: Vec::new(),
        }
    }

    /// Look up an account by name or id.
    pub fn find_account(&self, key: &str) -> Option<&AccountEntry> {
        self.accounts.iter().find(|a| a.name == key || a.id == key)
    }

    /// Add an account; names and ids must be unique.
    pub fn add_account(&mut self, entry: AccountEntry) -> Result<(), ConfigError> {
        if self.find_account(&entry.name).is_some() {
            return Err(ConfigError::DuplicateAccount(entry.name));
        }
        if self.find_account(&entry.id).is_some() {
            return Err(ConfigError::DuplicateAccount(entry.id));
        }
        self.accounts.push(entry);
        Ok(())
    }

    /// Resolve a scan selection into accounts, preserving selection order.
    ///
    /// - `["all"]` selects every configured account.
    /// - An empty selection picks accounts flagged `default`, or every
    ///   account when none is flagged.
    /// - Anything else is matched by name or id.
    pub fn select_accounts(&self, selection: &[String]) -> Result<Vec<Account>, ConfigError> {
        if self.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }

        if selection.is_empty() {
            let defaults: Vec<Account> =
                self.accounts.iter().filter(|a| a.default).map(AccountEntry::to_account).collect();
            if !defaults.is_empty() {
                return Ok(defaults);
            }
            return Ok(self.accounts.iter().map(AccountEntry::to_account).collect());
        }

        if selection.len() == 1 && selection[0] == "all" {
            return Ok(self.accounts.iter().map(AccountEntry::to_account).collect());
        }

        selection
            .iter()
            .map(|key| {
                self.find_account(key)
                    .map(AccountEntry::to_account)
                    .ok_or_else(|| ConfigError::UnknownAccount(key.clone()))
            })
            .collect()
    }
}
