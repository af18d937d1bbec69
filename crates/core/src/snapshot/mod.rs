//! Typed snapshot documents.
//!
//! Cached snapshots are raw provider responses. Each query kind the detectors
//! rely on gets a document type here, decoded once at the boundary so that
//! downstream code works with checked fields instead of poking into untyped
//! JSON. Collections default to empty, so a missing snapshot and an empty
//! response decode to the same value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::RegionDescriptor;

/// A cached snapshot as returned by a [`crate::store::ResourceStore`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Snapshot {
    /// No data was cached for the key.
    #[default]
    Empty,
    /// A parsed JSON document.
    Document(Value),
}

/// Error raised when a parsed snapshot does not have the shape its query implies.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot '{query}' does not match the expected document shape: {source}")]
    Shape {
        query: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Snapshot::Empty | Snapshot::Document(Value::Null))
    }

    /// Decode into a typed document; empty snapshots yield `T::default()`.
    pub fn decode<T>(&self, query: &str) -> Result<T, SnapshotError>
    where
        T: DeserializeOwned + Default,
    {
        match self {
            Snapshot::Empty | Snapshot::Document(Value::Null) => Ok(T::default()),
            Snapshot::Document(value) => T::deserialize(value)
                .map_err(|source| SnapshotError::Shape { query: query.to_string(), source }),
        }
    }
}

/// A document stored under a plain query name, e.g. `ec2-describe-volumes`.
pub trait QueryDocument: DeserializeOwned + Default {
    const QUERY: &'static str;
}

/// A document stored under `<service>-<function>/<parameter>`.
pub trait ParameterDocument: DeserializeOwned + Default {
    const SERVICE: &'static str;
    const FUNCTION: &'static str;

    /// Display name used in errors and logs.
    fn query_name() -> String {
        format!("{}-{}", Self::SERVICE, Self::FUNCTION)
    }
}

/// Account-level list of enabled regions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegionsDocument {
    #[serde(default)]
    pub regions: Vec<RegionDescriptor>,
}

impl QueryDocument for RegionsDocument {
    const QUERY: &'static str = "describe-regions";
}

/// Reference to a security group as embedded in other resources.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct GroupIdentifier {
    pub group_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupsDocument {
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
}

impl QueryDocument for SecurityGroupsDocument {
    const QUERY: &'static str = "ec2-describe-security-groups";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterfacesDocument {
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

impl QueryDocument for NetworkInterfacesDocument {
    const QUERY: &'static str = "ec2-describe-network-interfaces";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub network_interface_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumesDocument {
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

impl QueryDocument for VolumesDocument {
    const QUERY: &'static str = "ec2-describe-volumes";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub volume_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressesDocument {
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl QueryDocument for AddressesDocument {
    const QUERY: &'static str = "ec2-describe-addresses";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub public_ip: String,
    #[serde(default)]
    pub allocation_id: Option<String>,
    #[serde(default)]
    pub association_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassicLoadBalancersDocument {
    #[serde(default)]
    pub load_balancer_descriptions: Vec<ClassicLoadBalancer>,
}

impl QueryDocument for ClassicLoadBalancersDocument {
    const QUERY: &'static str = "elb-describe-load-balancers";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassicLoadBalancer {
    pub load_balancer_name: String,
    /// `None` when the field is missing, which is different from an empty list.
    #[serde(default)]
    pub instances: Option<Vec<InstanceRef>>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceRef {
    pub instance_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancersDocument {
    #[serde(default)]
    pub load_balancers: Vec<LoadBalancer>,
}

impl QueryDocument for LoadBalancersDocument {
    const QUERY: &'static str = "elbv2-describe-load-balancers";
}

/// A v2 (application, network or gateway) load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancer {
    pub load_balancer_arn: String,
    pub load_balancer_name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetGroupsDocument {
    #[serde(default)]
    pub target_groups: Vec<TargetGroup>,
}

impl ParameterDocument for TargetGroupsDocument {
    const SERVICE: &'static str = "elbv2";
    const FUNCTION: &'static str = "describe-target-groups";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetGroup {
    pub target_group_arn: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetHealthDocument {
    #[serde(default)]
    pub target_health_descriptions: Vec<TargetHealthDescription>,
}

impl ParameterDocument for TargetHealthDocument {
    const SERVICE: &'static str = "elbv2";
    const FUNCTION: &'static str = "describe-target-health";
}

/// Any entry counts as a registered target, whatever its health state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetHealthDescription {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstancesDocument {
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl QueryDocument for InstancesDocument {
    const QUERY: &'static str = "ec2-describe-instances";
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,
    #[serde(default)]
    pub state: Option<InstanceState>,
    #[serde(default)]
    pub security_groups: Vec<GroupIdentifier>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub placement: Option<Placement>,
}

impl Instance {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|t| t.key == key).map(|t| t.value.as_str())
    }

    pub fn state_name(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(default)]
    pub availability_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DbInstancesDocument {
    #[serde(rename = "DBInstances", default)]
    pub db_instances: Vec<DbInstance>,
}

impl QueryDocument for DbInstancesDocument {
    const QUERY: &'static str = "rds-describe-db-instances";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,
    #[serde(rename = "VpcSecurityGroups", default)]
    pub vpc_security_groups: Vec<VpcSecurityGroupMembership>,
    #[serde(rename = "ReadReplicaSourceDBInstanceIdentifier", default)]
    pub read_replica_source: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcSecurityGroupMembership {
    pub vpc_security_group_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaFunctionsDocument {
    #[serde(default)]
    pub functions: Vec<LambdaFunction>,
}

impl QueryDocument for LambdaFunctionsDocument {
    const QUERY: &'static str = "lambda-list-functions";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaFunction {
    pub function_name: String,
    #[serde(default)]
    pub vpc_config: Option<LambdaVpcConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaVpcConfig {
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheClustersDocument {
    #[serde(default)]
    pub cache_clusters: Vec<CacheCluster>,
}

impl QueryDocument for CacheClustersDocument {
    const QUERY: &'static str = "elasticache-describe-cache-clusters";
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheCluster {
    pub cache_cluster_id: String,
    #[serde(default)]
    pub security_groups: Vec<CacheSecurityGroupMembership>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheSecurityGroupMembership {
    pub security_group_id: String,
}
