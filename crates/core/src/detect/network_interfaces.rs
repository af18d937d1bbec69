use tracing::debug;

use crate::detect::{is_available, DetectResult, UnusedNetworkInterface};
use crate::model::Region;
use crate::snapshot::NetworkInterfacesDocument;
use crate::store::{fetch_document, ResourceStore};

/// Network interfaces with status `available` (not in use).
pub fn find_unused_network_interfaces(
    store: &dyn ResourceStore,
    region: &Region,
) -> DetectResult<Vec<UnusedNetworkInterface>> {
    let doc: NetworkInterfacesDocument = fetch_document(store, region)?;
    let unused: Vec<UnusedNetworkInterface> = doc
        .network_interfaces
        .into_iter()
        .filter(|eni| is_available(eni.status.as_deref()))
        .map(|eni| UnusedNetworkInterface { id: eni.network_interface_id })
        .collect();
    debug!(region = %region, count = unused.len(), "unused network interfaces");
    Ok(unused)
}
