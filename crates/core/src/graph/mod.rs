//! Resource graph used to detect indirect security-group usage.
//!
//! A security group can be in use without any network interface in the
//! region pointing at it (for example through a collapsed auto-scaling group
//! or a database node). The graph gives the detectors a per-node view of the
//! groups each resource uses.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Region;
use crate::store::StoreError;

pub mod snapshot_builder;

pub use snapshot_builder::SnapshotGraphBuilder;

/// Options controlling how the graph is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFilter {
    /// Include edges between resources inside the same VPC.
    pub internal_edges: bool,
    /// Include database read replicas as nodes.
    pub read_replicas: bool,
    /// Include edges between database nodes.
    pub inter_rds_edges: bool,
    /// Add availability-zone grouping nodes.
    pub azs: bool,
    /// Collapse instances that share a value for this tag key.
    pub collapse_by_tag: Option<String>,
    /// Collapse auto-scaling group members into one node per group.
    pub collapse_asgs: bool,
    /// Suppress diagnostic output while building.
    pub mute: bool,
}

impl GraphFilter {
    /// Fixed configuration used by the security-group detector.
    pub fn unused_detection() -> Self {
        Self {
            internal_edges: true,
            read_replicas: true,
            inter_rds_edges: true,
            azs: false,
            collapse_by_tag: None,
            collapse_asgs: true,
            mute: true,
        }
    }
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            internal_edges: true,
            read_replicas: true,
            inter_rds_edges: false,
            azs: false,
            collapse_by_tag: None,
            collapse_asgs: true,
            mute: false,
        }
    }
}

/// Kind of resource a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Ec2,
    AutoScalingGroup,
    TagGroup,
    Rds,
    Elb,
    Elbv2,
    Lambda,
    Elasticache,
    AvailabilityZone,
}

/// A resource in the graph and the security groups it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub security_groups: BTreeSet<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self { id: id.into(), kind, name: name.into(), security_groups: BTreeSet::new() }
    }

    /// Builder-style helper to attach security groups.
    pub fn with_security_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

/// Node id -> node.
pub type NodeMap = BTreeMap<String, GraphNode>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Failed to load graph input: {0}")]
    Store(#[from] StoreError),
}

/// Builds the resource graph for one region.
pub trait ResourceGraphBuilder {
    fn build(&self, region: &Region, filter: &GraphFilter) -> Result<NodeMap, GraphError>;
}
