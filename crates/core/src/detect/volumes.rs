use tracing::debug;

use crate::detect::{is_available, DetectResult, UnusedVolume};
use crate::model::Region;
use crate::snapshot::VolumesDocument;
use crate::store::{fetch_document, ResourceStore};

/// Volumes in state `available`, i.e. not attached to any instance.
pub fn find_unused_volumes(
    store: &dyn ResourceStore,
    region: &Region,
) -> DetectResult<Vec<UnusedVolume>> {
    let doc: VolumesDocument = fetch_document(store, region)?;
    let unused: Vec<UnusedVolume> = doc
        .volumes
        .into_iter()
        .filter(|v| is_available(v.state.as_deref()))
        .map(|v| UnusedVolume { id: v.volume_id })
        .collect();
    debug!(region = %region, count = unused.len(), "unused volumes");
    Ok(unused)
}
