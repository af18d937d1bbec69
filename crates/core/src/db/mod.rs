//! Workspace configuration, layout, and scan-history database.
//!
//! - `WorkspaceLayout`: computed paths for workspace directories/files.
//! - `WorkspaceConfig`: serializable workspace metadata and account list.
//! - `ScanDb`: a small SQLite wrapper recording scan runs and their findings.
//! - `WorkspaceContext`: layout + config + open database bundled together.

pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod scan_db;
pub mod util;

pub use config::{AccountEntry, ConfigError, DbConfig, WorkspaceConfig};
pub use context::WorkspaceContext;
pub use layout::WorkspaceLayout;
pub use models::{findings_from_reports, FindingRecord, ScanRunRecord, ScanRunStatus};
pub use scan_db::{DbError, DbResult, ScanDb, CURRENT_SCHEMA_VERSION};
pub use util::{
    load_accounts_file, load_workspace_config, open_scan_db, resolve_data_dir,
    save_workspace_config,
};
