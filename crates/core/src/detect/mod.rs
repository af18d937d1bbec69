//! Unused-resource detectors.
//!
//! One detector per resource type. Each is a pure function of the cached
//! snapshots for a single region (plus the resource graph for security
//! groups) and returns fresh records describing what it found unused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{GraphError, ResourceGraphBuilder};
use crate::model::Region;
use crate::store::{ResourceStore, StoreError};

pub mod elastic_ips;
pub mod load_balancers;
pub mod network_interfaces;
pub mod security_groups;
pub mod volumes;

pub use elastic_ips::{find_unused_elastic_ips, UNALLOCATED_IP};
pub use load_balancers::{find_unused_load_balancers, CLASSIC_LOAD_BALANCER_TYPE};
pub use network_interfaces::find_unused_network_interfaces;
pub use security_groups::find_unused_security_groups;
pub use volumes::find_unused_volumes;

/// Status/state value the provider uses for detached volumes and interfaces.
pub const AVAILABLE: &str = "available";

/// True when a recorded state is exactly `available`; a missing state is not.
pub fn is_available(state: Option<&str>) -> bool {
    state == Some(AVAILABLE)
}

/// Error type for a single detector invocation.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Failed to load snapshot: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build resource graph: {0}")]
    Graph(#[from] GraphError),
}

/// Convenience result type for detectors.
pub type DetectResult<T> = Result<T, DetectError>;

/// Resource types the detectors cover, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    SecurityGroups,
    Volumes,
    ElasticIps,
    NetworkInterfaces,
    ElasticLoadBalancers,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::SecurityGroups,
        ResourceKind::Volumes,
        ResourceKind::ElasticIps,
        ResourceKind::NetworkInterfaces,
        ResourceKind::ElasticLoadBalancers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::SecurityGroups => "security_groups",
            ResourceKind::Volumes => "volumes",
            ResourceKind::ElasticIps => "elastic_ips",
            ResourceKind::NetworkInterfaces => "network_interfaces",
            ResourceKind::ElasticLoadBalancers => "elastic_load_balancers",
        }
    }

    /// Human-readable label for text output.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::SecurityGroups => "Security groups",
            ResourceKind::Volumes => "Volumes",
            ResourceKind::ElasticIps => "Elastic IPs",
            ResourceKind::NetworkInterfaces => "Network interfaces",
            ResourceKind::ElasticLoadBalancers => "Load balancers",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ResourceKind::ALL.into_iter().find(|k| k.as_str() == value)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedSecurityGroup {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedVolume {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedElasticIp {
    /// Allocation id, or [`UNALLOCATED_IP`] when the address has none.
    pub id: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedNetworkInterface {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedLoadBalancer {
    #[serde(rename = "LoadBalancerName")]
    pub name: String,
    /// `classic`, or the v2 type as reported by the provider.
    #[serde(rename = "Type")]
    pub kind: String,
}

/// One unused-resource record. Serialized without a tag, as the bare record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UnusedResource {
    SecurityGroup(UnusedSecurityGroup),
    Volume(UnusedVolume),
    ElasticIp(UnusedElasticIp),
    NetworkInterface(UnusedNetworkInterface),
    LoadBalancer(UnusedLoadBalancer),
}

impl UnusedResource {
    /// The identifier a human would look the resource up by.
    pub fn id(&self) -> &str {
        match self {
            UnusedResource::SecurityGroup(r) => &r.id,
            UnusedResource::Volume(r) => &r.id,
            UnusedResource::ElasticIp(r) => &r.id,
            UnusedResource::NetworkInterface(r) => &r.id,
            UnusedResource::LoadBalancer(r) => &r.name,
        }
    }

    /// One-line summary for text output.
    pub fn summary(&self) -> String {
        match self {
            UnusedResource::SecurityGroup(r) if r.description.is_empty() => {
                format!("{} ({})", r.id, r.name)
            }
            UnusedResource::SecurityGroup(r) => {
                format!("{} ({}) - {}", r.id, r.name, r.description)
            }
            UnusedResource::Volume(r) => r.id.clone(),
            UnusedResource::ElasticIp(r) => format!("{} [{}]", r.ip, r.id),
            UnusedResource::NetworkInterface(r) => r.id.clone(),
            UnusedResource::LoadBalancer(r) => format!("{} [{}]", r.name, r.kind),
        }
    }
}

/// Run the detector for `kind` against one region.
pub fn run_detector(
    kind: ResourceKind,
    store: &dyn ResourceStore,
    graph: &dyn ResourceGraphBuilder,
    region: &Region,
) -> DetectResult<Vec<UnusedResource>> {
    let found = match kind {
        ResourceKind::SecurityGroups => find_unused_security_groups(store, graph, region)?
            .into_iter()
            .map(UnusedResource::SecurityGroup)
            .collect(),
        ResourceKind::Volumes => {
            find_unused_volumes(store, region)?.into_iter().map(UnusedResource::Volume).collect()
        }
        ResourceKind::ElasticIps => find_unused_elastic_ips(store, region)?
            .into_iter()
            .map(UnusedResource::ElasticIp)
            .collect(),
        ResourceKind::NetworkInterfaces => find_unused_network_interfaces(store, region)?
            .into_iter()
            .map(UnusedResource::NetworkInterface)
            .collect(),
        ResourceKind::ElasticLoadBalancers => find_unused_load_balancers(store, region)?
            .into_iter()
            .map(UnusedResource::LoadBalancer)
            .collect(),
    };
    Ok(found)
}
