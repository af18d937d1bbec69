use tracing::debug;

use crate::detect::{DetectResult, UnusedElasticIp};
use crate::model::Region;
use crate::snapshot::{Address, AddressesDocument};
use crate::store::{fetch_document, ResourceStore};

/// Id reported for an unassociated address that has no allocation id.
pub const UNALLOCATED_IP: &str = "Un-allocated IP";

/// An address is unused when nothing is associated with it.
pub fn is_unassociated(address: &Address) -> bool {
    address.association_id.is_none()
}

/// Elastic IPs without an association.
pub fn find_unused_elastic_ips(
    store: &dyn ResourceStore,
    region: &Region,
) -> DetectResult<Vec<UnusedElasticIp>> {
    let doc: AddressesDocument = fetch_document(store, region)?;
    let unused: Vec<UnusedElasticIp> = doc
        .addresses
        .into_iter()
        .filter(is_unassociated)
        .map(|a| UnusedElasticIp {
            id: a.allocation_id.unwrap_or_else(|| UNALLOCATED_IP.to_string()),
            ip: a.public_ip,
        })
        .collect();
    debug!(region = %region, count = unused.len(), "unused elastic ips");
    Ok(unused)
}
