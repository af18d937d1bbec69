//! Snapshot store abstraction.
//!
//! The store hands out previously cached provider responses keyed by account,
//! region and query name. Absence is a valid outcome and is never an error;
//! only unreadable or unparseable data is.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Account, Region, RegionDescriptor};
use crate::snapshot::{ParameterDocument, QueryDocument, Snapshot, SnapshotError};

pub mod fs;

pub use fs::{encode_parameter, FsResourceStore, MAX_EMPTY_PARAMETER_FILE_BYTES};

/// Error type for snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot exists but could not be read.
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot exists but is not valid JSON.
    #[error("Corrupt snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot is valid JSON but not the document we expected.
    #[error(transparent)]
    Document(#[from] SnapshotError),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to cached snapshots.
pub trait ResourceStore {
    /// Look up a snapshot by query name, at account level when `region` is `None`.
    ///
    /// Returns [`Snapshot::Empty`] when nothing was cached for the key.
    fn query(&self, account: &Account, region: Option<&str>, query: &str)
        -> StoreResult<Snapshot>;

    /// Look up a snapshot produced by a call that took a parameter (e.g. an ARN).
    ///
    /// Returns `None` when the data is absent or effectively empty.
    fn query_parameter(
        &self,
        region: &Region,
        service: &str,
        function: &str,
        parameter: &str,
    ) -> StoreResult<Option<Snapshot>>;
}

/// Enumerates the regions of an account, in a stable order.
pub trait RegionDirectory {
    fn regions(&self, account: &Account) -> StoreResult<Vec<RegionDescriptor>>;
}

/// Fetch and decode a regional query document.
pub fn fetch_document<D: QueryDocument>(
    store: &dyn ResourceStore,
    region: &Region,
) -> StoreResult<D> {
    let snapshot = store.query(&region.account, Some(&region.name), D::QUERY)?;
    Ok(snapshot.decode(D::QUERY)?)
}

/// Fetch and decode a parameterized document; `None` means no data was cached.
pub fn fetch_parameter_document<D: ParameterDocument>(
    store: &dyn ResourceStore,
    region: &Region,
    parameter: &str,
) -> StoreResult<Option<D>> {
    match store.query_parameter(region, D::SERVICE, D::FUNCTION, parameter)? {
        Some(snapshot) => Ok(Some(snapshot.decode(&D::query_name())?)),
        None => Ok(None),
    }
}
