use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::model::{Account, Region, RegionDescriptor};
use crate::snapshot::{QueryDocument, RegionsDocument, Snapshot};
use crate::store::{RegionDirectory, ResourceStore, StoreError, StoreResult};

/// Parameter files at or below this size hold no usable data.
pub const MAX_EMPTY_PARAMETER_FILE_BYTES: u64 = 4;

/// Snapshot store backed by a directory tree of JSON files.
///
/// Layout, relative to `root`:
/// - `<account>/<query>.json` for account-level queries
/// - `<account>/<region>/<query>.json` for regional queries
/// - `<account>/<region>/<service>-<function>/<encoded parameter>` for
///   parameterized calls
///
/// The account component is the account *name*.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
}

impl FsResourceStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every snapshot of one account.
    pub fn account_dir(&self, account: &Account) -> PathBuf {
        self.root.join(&account.name)
    }

    /// Compute the file backing a query. Does not touch the filesystem.
    pub fn query_path(&self, account: &Account, region: Option<&str>, query: &str) -> PathBuf {
        let dir = self.account_dir(account);
        let dir = match region {
            Some(region) => dir.join(region),
            None => dir,
        };
        dir.join(format!("{query}.json"))
    }

    /// Compute the file backing a parameterized call. Does not touch the filesystem.
    pub fn parameter_path(
        &self,
        region: &Region,
        service: &str,
        function: &str,
        parameter: &str,
    ) -> PathBuf {
        self.account_dir(&region.account)
            .join(&region.name)
            .join(format!("{service}-{function}"))
            .join(encode_parameter(parameter))
    }
}

/// Encode a parameter value for use as a file name.
///
/// Everything except ASCII alphanumerics and `_.-~` is percent-encoded and
/// spaces become `+`, matching how the collector names these files.
pub fn encode_parameter(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// Read a snapshot file. Only a missing file counts as absent; any other
/// read failure (a directory at the key, permissions) is an error.
fn read_body(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(body)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
}

fn parse_document(path: &Path, body: &str) -> StoreResult<Snapshot> {
    if body.trim().is_empty() {
        return Ok(Snapshot::Empty);
    }
    let value = serde_json::from_str(body)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;
    Ok(Snapshot::Document(value))
}

impl ResourceStore for FsResourceStore {
    fn query(
        &self,
        account: &Account,
        region: Option<&str>,
        query: &str,
    ) -> StoreResult<Snapshot> {
        let path = self.query_path(account, region, query);
        match read_body(&path)? {
            Some(body) => parse_document(&path, &body),
            None => {
                debug!(path = %path.display(), "no cached snapshot");
                Ok(Snapshot::Empty)
            }
        }
    }

    fn query_parameter(
        &self,
        region: &Region,
        service: &str,
        function: &str,
        parameter: &str,
    ) -> StoreResult<Option<Snapshot>> {
        let path = self.parameter_path(region, service, function, parameter);
        let Some(body) = read_body(&path)? else {
            debug!(path = %path.display(), "no cached parameter snapshot");
            return Ok(None);
        };
        let size = body.len() as u64;
        if size <= MAX_EMPTY_PARAMETER_FILE_BYTES {
            warn!(
                path = %path.display(),
                size,
                "parameter snapshot too small, treating as no data"
            );
            return Ok(None);
        }
        parse_document(&path, &body).map(Some)
    }
}

impl RegionDirectory for FsResourceStore {
    fn regions(&self, account: &Account) -> StoreResult<Vec<RegionDescriptor>> {
        let snapshot = self.query(account, None, RegionsDocument::QUERY)?;
        let doc: RegionsDocument = snapshot.decode(RegionsDocument::QUERY)?;
        Ok(doc.regions)
    }
}
