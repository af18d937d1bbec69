use std::path::{Path, PathBuf};

/// Logical layout of a workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI or other frontends are responsible for actually creating directories
/// and files based on this layout.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace.
    pub root: PathBuf,
    /// Directory for internal metadata (.sweep).
    pub meta_dir: PathBuf,
    /// Path to the workspace config file (JSON).
    pub config_path: PathBuf,
    /// Path to the scan-history database file.
    pub db_path: PathBuf,
    /// Default directory holding cached account snapshots.
    pub data_dir: PathBuf,
    /// Directory for written scan reports.
    pub reports_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the default layout for a workspace rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".sweep");
        let config_path = meta_dir.join("config.json");
        let db_path = meta_dir.join("sweep.db");
        let data_dir = root.join("account-data");
        let reports_dir = root.join("reports");

        Self { root, meta_dir, config_path, db_path, data_dir, reports_dir }
    }

    /// Database path suitable for storing in `WorkspaceConfig`, relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        relative_string(&self.root, &self.db_path)
    }

    /// Default data directory, relative to `root`.
    pub fn data_dir_relative_string(&self) -> String {
        relative_string(&self.root, &self.data_dir)
    }

    /// Path for a report file named after a scan run id.
    pub fn report_path(&self, run_id: i64) -> PathBuf {
        self.reports_dir.join(format!("unused-resources-{run_id}.json"))
    }

    /// Resolve a config path that may be relative to the workspace root.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn relative_string(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => path.to_string_lossy().to_string(),
    }
}
