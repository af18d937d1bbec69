use tracing::debug;

use crate::graph::{GraphError, GraphFilter, GraphNode, NodeKind, NodeMap, ResourceGraphBuilder};
use crate::model::Region;
use crate::snapshot::{
    CacheClustersDocument, ClassicLoadBalancersDocument, DbInstancesDocument, Instance,
    InstancesDocument, LambdaFunctionsDocument, LoadBalancersDocument,
};
use crate::store::{fetch_document, ResourceStore};

/// Tag set by EC2 auto scaling on every member instance.
pub const ASG_TAG: &str = "aws:autoscaling:groupName";

/// Instance states that no longer hold on to their security groups.
///
/// `stopping` and `stopped` instances keep their groups and stay in the graph.
const GONE_INSTANCE_STATES: &[&str] = &["terminated", "shutting-down"];

/// Graph builder that derives nodes from cached snapshots of the same region.
///
/// Only node membership and security groups are computed; the edge options on
/// [`GraphFilter`] do not change either.
pub struct SnapshotGraphBuilder<'a> {
    pub store: &'a dyn ResourceStore,
}

impl<'a> SnapshotGraphBuilder<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self { store }
    }

    fn add_instances(
        &self,
        region: &Region,
        filter: &GraphFilter,
        nodes: &mut NodeMap,
    ) -> Result<(), GraphError> {
        let doc: InstancesDocument = fetch_document(self.store, region)?;
        for instance in doc.reservations.iter().flat_map(|r| r.instances.iter()) {
            if instance.state_name().is_some_and(|s| GONE_INSTANCE_STATES.contains(&s)) {
                if !filter.mute {
                    debug!(instance = %instance.instance_id, "skipping terminated instance");
                }
                continue;
            }

            merge(nodes, instance_node(instance, filter));

            if filter.azs {
                if let Some(zone) =
                    instance.placement.as_ref().and_then(|p| p.availability_zone.as_deref())
                {
                    merge(
                        nodes,
                        GraphNode::new(format!("az:{zone}"), NodeKind::AvailabilityZone, zone),
                    );
                }
            }
        }
        Ok(())
    }

    fn add_databases(
        &self,
        region: &Region,
        filter: &GraphFilter,
        nodes: &mut NodeMap,
    ) -> Result<(), GraphError> {
        let doc: DbInstancesDocument = fetch_document(self.store, region)?;
        for db in doc.db_instances {
            if db.read_replica_source.is_some() && !filter.read_replicas {
                if !filter.mute {
                    debug!(db = %db.identifier, "skipping read replica");
                }
                continue;
            }
            let node = GraphNode::new(db.identifier.clone(), NodeKind::Rds, db.identifier)
                .with_security_groups(
                    db.vpc_security_groups.into_iter().map(|g| g.vpc_security_group_id),
                );
            merge(nodes, node);
        }
        Ok(())
    }

    fn add_load_balancers(&self, region: &Region, nodes: &mut NodeMap) -> Result<(), GraphError> {
        let classic: ClassicLoadBalancersDocument = fetch_document(self.store, region)?;
        for lb in classic.load_balancer_descriptions {
            let node = GraphNode::new(
                format!("elb:{}", lb.load_balancer_name),
                NodeKind::Elb,
                lb.load_balancer_name,
            )
            .with_security_groups(lb.security_groups);
            merge(nodes, node);
        }

        let v2: LoadBalancersDocument = fetch_document(self.store, region)?;
        for lb in v2.load_balancers {
            let node = GraphNode::new(lb.load_balancer_arn, NodeKind::Elbv2, lb.load_balancer_name)
                .with_security_groups(lb.security_groups);
            merge(nodes, node);
        }
        Ok(())
    }

    fn add_functions(&self, region: &Region, nodes: &mut NodeMap) -> Result<(), GraphError> {
        let doc: LambdaFunctionsDocument = fetch_document(self.store, region)?;
        for function in doc.functions {
            // Functions outside a VPC have no security groups and are not part of the graph.
            let Some(vpc) = function.vpc_config else { continue };
            if vpc.security_group_ids.is_empty() {
                continue;
            }
            let node = GraphNode::new(
                format!("lambda:{}", function.function_name),
                NodeKind::Lambda,
                function.function_name,
            )
            .with_security_groups(vpc.security_group_ids);
            merge(nodes, node);
        }
        Ok(())
    }

    fn add_cache_clusters(&self, region: &Region, nodes: &mut NodeMap) -> Result<(), GraphError> {
        let doc: CacheClustersDocument = fetch_document(self.store, region)?;
        for cluster in doc.cache_clusters {
            let node = GraphNode::new(
                format!("elasticache:{}", cluster.cache_cluster_id),
                NodeKind::Elasticache,
                cluster.cache_cluster_id,
            )
            .with_security_groups(cluster.security_groups.into_iter().map(|g| g.security_group_id));
            merge(nodes, node);
        }
        Ok(())
    }
}

impl ResourceGraphBuilder for SnapshotGraphBuilder<'_> {
    fn build(&self, region: &Region, filter: &GraphFilter) -> Result<NodeMap, GraphError> {
        let mut nodes = NodeMap::new();
        self.add_instances(region, filter, &mut nodes)?;
        self.add_databases(region, filter, &mut nodes)?;
        self.add_load_balancers(region, &mut nodes)?;
        self.add_functions(region, &mut nodes)?;
        self.add_cache_clusters(region, &mut nodes)?;
        if !filter.mute {
            debug!(region = %region, nodes = nodes.len(), "built resource graph");
        }
        Ok(nodes)
    }
}

/// Pick the node an instance belongs to, honoring the collapse options.
fn instance_node(instance: &Instance, filter: &GraphFilter) -> GraphNode {
    let groups = instance.security_groups.iter().map(|g| g.group_id.clone());

    if filter.collapse_asgs {
        if let Some(asg) = instance.tag(ASG_TAG) {
            return GraphNode::new(format!("asg:{asg}"), NodeKind::AutoScalingGroup, asg)
                .with_security_groups(groups);
        }
    }
    if let Some(key) = filter.collapse_by_tag.as_deref() {
        if let Some(value) = instance.tag(key) {
            return GraphNode::new(format!("tag:{key}:{value}"), NodeKind::TagGroup, value)
                .with_security_groups(groups);
        }
    }

    let name = instance.tag("Name").unwrap_or(instance.instance_id.as_str()).to_string();
    GraphNode::new(instance.instance_id.clone(), NodeKind::Ec2, name).with_security_groups(groups)
}

/// Insert a node, unioning security groups into an existing node with the same id.
fn merge(nodes: &mut NodeMap, node: GraphNode) {
    match nodes.get_mut(&node.id) {
        Some(existing) => existing.security_groups.extend(node.security_groups),
        None => {
            nodes.insert(node.id.clone(), node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{GroupIdentifier, Tag};

    fn instance(id: &str, groups: &[&str], tags: &[(&str, &str)]) -> Instance {
        Instance {
            instance_id: id.to_string(),
            state: None,
            security_groups: groups
                .iter()
                .map(|g| GroupIdentifier { group_id: g.to_string() })
                .collect(),
            tags: tags
                .iter()
                .map(|(k, v)| Tag { key: k.to_string(), value: v.to_string() })
                .collect(),
            placement: None,
        }
    }

    #[test]
    fn asg_members_collapse_into_one_node() {
        let filter = GraphFilter::unused_detection();
        let mut nodes = NodeMap::new();
        merge(&mut nodes, instance_node(&instance("i-1", &["sg-a"], &[(ASG_TAG, "web")]), &filter));
        merge(&mut nodes, instance_node(&instance("i-2", &["sg-b"], &[(ASG_TAG, "web")]), &filter));

        assert_eq!(nodes.len(), 1);
        let node = &nodes["asg:web"];
        assert_eq!(node.kind, NodeKind::AutoScalingGroup);
        assert_eq!(node.security_groups.len(), 2);
    }

    #[test]
    fn asg_members_stay_separate_without_collapse() {
        let filter = GraphFilter { collapse_asgs: false, ..GraphFilter::unused_detection() };
        let node = instance_node(&instance("i-1", &["sg-a"], &[(ASG_TAG, "web")]), &filter);
        assert_eq!(node.id, "i-1");
        assert_eq!(node.kind, NodeKind::Ec2);
    }

    #[test]
    fn collapse_by_tag_groups_instances_by_value() {
        let filter =
            GraphFilter { collapse_by_tag: Some("role".into()), ..GraphFilter::unused_detection() };
        let node = instance_node(&instance("i-9", &["sg-x"], &[("role", "worker")]), &filter);
        assert_eq!(node.id, "tag:role:worker");
        assert_eq!(node.name, "worker");
    }

    #[test]
    fn plain_instance_uses_name_tag_for_display() {
        let filter = GraphFilter::unused_detection();
        let node = instance_node(&instance("i-3", &[], &[("Name", "bastion")]), &filter);
        assert_eq!(node.id, "i-3");
        assert_eq!(node.name, "bastion");
    }
}
