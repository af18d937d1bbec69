use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::detect::{DetectResult, UnusedSecurityGroup};
use crate::graph::{GraphFilter, ResourceGraphBuilder};
use crate::model::Region;
use crate::snapshot::{NetworkInterfacesDocument, SecurityGroup, SecurityGroupsDocument};
use crate::store::{fetch_document, ResourceStore};

/// Security groups that are defined in the region but referenced by nothing.
///
/// A group counts as used when any network interface carries it, or when any
/// node of the resource graph (built with [`GraphFilter::unused_detection`])
/// records it. Results are ordered by group id.
pub fn find_unused_security_groups(
    store: &dyn ResourceStore,
    graph: &dyn ResourceGraphBuilder,
    region: &Region,
) -> DetectResult<Vec<UnusedSecurityGroup>> {
    let defined: SecurityGroupsDocument = fetch_document(store, region)?;
    let defined: BTreeMap<String, SecurityGroup> =
        defined.security_groups.into_iter().map(|sg| (sg.group_id.clone(), sg)).collect();

    let interfaces: NetworkInterfacesDocument = fetch_document(store, region)?;
    let mut used: BTreeSet<String> = interfaces
        .network_interfaces
        .into_iter()
        .flat_map(|eni| eni.groups.into_iter().map(|g| g.group_id))
        .collect();

    let nodes = graph.build(region, &GraphFilter::unused_detection())?;
    for node in nodes.into_values() {
        used.extend(node.security_groups);
    }

    let unused: Vec<UnusedSecurityGroup> = defined
        .into_iter()
        .filter(|(id, _)| !used.contains(id))
        .map(|(id, sg)| UnusedSecurityGroup {
            id,
            name: sg.group_name,
            description: sg.description.unwrap_or_default(),
        })
        .collect();
    debug!(region = %region, count = unused.len(), "unused security groups");
    Ok(unused)
}
