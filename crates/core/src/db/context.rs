use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::db::{open_scan_db, resolve_data_dir, ScanDb, WorkspaceConfig, WorkspaceLayout};
use crate::store::FsResourceStore;

/// Convenience wrapper bundling layout, config, db path, and an open ScanDb.
#[derive(Debug)]
pub struct WorkspaceContext {
    pub layout: WorkspaceLayout,
    pub config: WorkspaceConfig,
    pub db_path: PathBuf,
    pub db: ScanDb,
}

impl WorkspaceContext {
    /// Load workspace config and open the database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        let (config, db_path, db) = open_scan_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }

    pub fn data_dir(&self) -> PathBuf {
        resolve_data_dir(&self.layout, &self.config)
    }

    /// Snapshot store reading from the configured data directory.
    pub fn store(&self) -> FsResourceStore {
        FsResourceStore::new(self.data_dir())
    }
}
