mod support;

use serde_json::json;
use support::{lb_arn, region, Fixture, StaticGraph};
use sweep_core::detect::{
    find_unused_elastic_ips, find_unused_load_balancers, find_unused_network_interfaces,
    find_unused_security_groups, find_unused_volumes, DetectError, UnusedLoadBalancer,
    UNALLOCATED_IP,
};
use sweep_core::graph::{GraphNode, NodeKind, NodeMap, SnapshotGraphBuilder};
use sweep_core::store::StoreError;

fn security_groups(fx: &Fixture, r: &sweep_core::model::Region, ids: &[&str]) {
    let groups: Vec<_> = ids
        .iter()
        .map(|id| json!({"GroupId": id, "GroupName": format!("{id}-name"), "Description": format!("{id} desc")}))
        .collect();
    fx.query(r, "ec2-describe-security-groups", json!({"SecurityGroups": groups}));
}

#[test]
fn security_group_referenced_by_interface_is_used() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    security_groups(&fx, &r, &["sg-1", "sg-2"]);
    fx.query(
        &r,
        "ec2-describe-network-interfaces",
        json!({"NetworkInterfaces": [
            {"NetworkInterfaceId": "eni-1", "Status": "in-use", "Groups": [{"GroupId": "sg-1", "GroupName": "a"}]}
        ]}),
    );

    let unused = find_unused_security_groups(&fx.store, &StaticGraph::default(), &r).unwrap();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].id, "sg-2");
    assert_eq!(unused[0].name, "sg-2-name");
    assert_eq!(unused[0].description, "sg-2 desc");
}

#[test]
fn security_group_referenced_only_by_graph_is_used() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    security_groups(&fx, &r, &["sg-1", "sg-2", "sg-3"]);

    let mut nodes = NodeMap::new();
    nodes.insert(
        "asg:web".into(),
        GraphNode::new("asg:web", NodeKind::AutoScalingGroup, "web").with_security_groups(["sg-3"]),
    );
    let mut graph = StaticGraph::default();
    graph.nodes.insert("us-east-1".into(), nodes);

    let unused = find_unused_security_groups(&fx.store, &graph, &r).unwrap();
    let ids: Vec<&str> = unused.iter().map(|sg| sg.id.as_str()).collect();
    assert_eq!(ids, vec!["sg-1", "sg-2"]);
}

#[test]
fn security_group_output_is_subset_of_defined() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    security_groups(&fx, &r, &["sg-1"]);
    fx.query(
        &r,
        "ec2-describe-network-interfaces",
        json!({"NetworkInterfaces": [
            {"NetworkInterfaceId": "eni-1", "Groups": [{"GroupId": "sg-other-account"}]}
        ]}),
    );

    let unused = find_unused_security_groups(&fx.store, &StaticGraph::default(), &r).unwrap();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].id, "sg-1");
}

#[test]
fn security_group_description_defaults_to_empty() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(
        &r,
        "ec2-describe-security-groups",
        json!({"SecurityGroups": [{"GroupId": "sg-9", "GroupName": "bare"}]}),
    );
    let unused = find_unused_security_groups(&fx.store, &StaticGraph::default(), &r).unwrap();
    assert_eq!(unused[0].description, "");
}

#[test]
fn volumes_reported_only_when_available() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(
        &r,
        "ec2-describe-volumes",
        json!({"Volumes": [
            {"VolumeId": "vol-1", "State": "in-use"},
            {"VolumeId": "vol-2", "State": "available"},
            {"VolumeId": "vol-3", "State": "available"},
            {"VolumeId": "vol-4"}
        ]}),
    );
    let ids: Vec<String> =
        find_unused_volumes(&fx.store, &r).unwrap().into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec!["vol-2", "vol-3"]);
}

#[test]
fn missing_volume_snapshot_reports_nothing() {
    let fx = Fixture::new();
    assert!(find_unused_volumes(&fx.store, &region("us-east-1")).unwrap().is_empty());
}

#[test]
fn elastic_ips_without_association_are_unused() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(
        &r,
        "ec2-describe-addresses",
        json!({"Addresses": [
            {"PublicIp": "1.1.1.1", "AllocationId": "eipalloc-1", "AssociationId": "eipassoc-1"},
            {"PublicIp": "2.2.2.2", "AllocationId": "eipalloc-2"},
            {"PublicIp": "3.3.3.3", "AssociationId": null},
            {"PublicIp": "4.4.4.4", "AllocationId": "eipalloc-4", "AssociationId": null}
        ]}),
    );
    let unused = find_unused_elastic_ips(&fx.store, &r).unwrap();
    let pairs: Vec<(&str, &str)> = unused.iter().map(|e| (e.id.as_str(), e.ip.as_str())).collect();
    assert_eq!(
        pairs,
        vec![("eipalloc-2", "2.2.2.2"), (UNALLOCATED_IP, "3.3.3.3"), ("eipalloc-4", "4.4.4.4")]
    );
}

#[test]
fn network_interfaces_reported_when_available() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(
        &r,
        "ec2-describe-network-interfaces",
        json!({"NetworkInterfaces": [
            {"NetworkInterfaceId": "eni-1", "Status": "in-use"},
            {"NetworkInterfaceId": "eni-2", "Status": "available"}
        ]}),
    );
    let unused = find_unused_network_interfaces(&fx.store, &r).unwrap();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].id, "eni-2");
}

#[test]
fn classic_load_balancer_with_no_instances_is_unused() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(
        &r,
        "elb-describe-load-balancers",
        json!({"LoadBalancerDescriptions": [
            {"LoadBalancerName": "empty", "Instances": []},
            {"LoadBalancerName": "busy", "Instances": [{"InstanceId": "i-1"}]}
        ]}),
    );
    let unused = find_unused_load_balancers(&fx.store, &r).unwrap();
    assert_eq!(unused, vec![UnusedLoadBalancer { name: "empty".into(), kind: "classic".into() }]);
}

fn v2_load_balancers(fx: &Fixture, r: &sweep_core::model::Region, names: &[(&str, &str)]) {
    let lbs: Vec<_> = names
        .iter()
        .map(|(name, kind)| {
            json!({"LoadBalancerArn": lb_arn(r, name), "LoadBalancerName": name, "Type": kind})
        })
        .collect();
    fx.query(r, "elbv2-describe-load-balancers", json!({"LoadBalancers": lbs}));
}

#[test]
fn v2_load_balancer_with_only_empty_target_groups_is_unused() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("lb1", "application")]);
    fx.v2_load_balancer(&r, "lb1", &[0, 0]);

    let unused = find_unused_load_balancers(&fx.store, &r).unwrap();
    assert_eq!(unused, vec![UnusedLoadBalancer { name: "lb1".into(), kind: "application".into() }]);
}

#[test]
fn v2_load_balancer_with_any_target_is_used() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("lb1", "application")]);
    fx.v2_load_balancer(&r, "lb1", &[0, 1]);

    assert!(find_unused_load_balancers(&fx.store, &r).unwrap().is_empty());
}

#[test]
fn v2_load_balancer_without_target_groups_is_unused() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("lonely", "network")]);

    let unused = find_unused_load_balancers(&fx.store, &r).unwrap();
    assert_eq!(unused, vec![UnusedLoadBalancer { name: "lonely".into(), kind: "network".into() }]);
}

#[test]
fn live_load_balancer_does_not_remove_earlier_unused_one() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("idle", "application"), ("live", "network"), ("gw", "gateway")]);
    fx.v2_load_balancer(&r, "idle", &[0]);
    fx.v2_load_balancer(&r, "live", &[2, 0]);
    fx.v2_load_balancer(&r, "gw", &[0, 0, 0]);

    let names: Vec<String> =
        find_unused_load_balancers(&fx.store, &r).unwrap().into_iter().map(|lb| lb.name).collect();
    assert_eq!(names, vec!["idle", "gw"]);
}

#[test]
fn live_target_group_short_circuits_remaining_lookups() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("lb1", "application")]);
    fx.v2_load_balancer(&r, "lb1", &[1, 0]);
    // A corrupt second target group is never read once the first has targets.
    fx.parameter_raw(
        &r,
        "elbv2",
        "describe-target-health",
        &format!("{}/tg1", lb_arn(&r, "lb1")),
        "corrupt{",
    );

    assert!(find_unused_load_balancers(&fx.store, &r).unwrap().is_empty());
}

#[test]
fn corrupt_target_health_is_fatal() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    v2_load_balancers(&fx, &r, &[("lb1", "application")]);
    fx.v2_load_balancer(&r, "lb1", &[0]);
    fx.parameter_raw(
        &r,
        "elbv2",
        "describe-target-health",
        &format!("{}/tg0", lb_arn(&r, "lb1")),
        "corrupt{",
    );

    let err = find_unused_load_balancers(&fx.store, &r).unwrap_err();
    assert!(matches!(err, DetectError::Store(_)));
}

#[test]
fn security_group_missing_required_field_is_fatal() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    fx.query(&r, "ec2-describe-security-groups", json!({"SecurityGroups": [{"GroupName": "x"}]}));
    let err = find_unused_security_groups(&fx.store, &StaticGraph::default(), &r).unwrap_err();
    assert!(err.to_string().contains("ec2-describe-security-groups"));
}

#[test]
fn unreadable_interface_snapshot_fails_security_group_detection() {
    let fx = Fixture::new();
    let r = region("us-east-1");
    security_groups(&fx, &r, &["sg-1"]);
    let interfaces = fx
        .account_dir(&r.account)
        .join(&r.name)
        .join("ec2-describe-network-interfaces.json");
    std::fs::create_dir_all(&interfaces).unwrap();

    let graph = SnapshotGraphBuilder::new(&fx.store);
    let err = find_unused_security_groups(&fx.store, &graph, &r).unwrap_err();
    assert!(matches!(err, DetectError::Store(StoreError::Io { .. })));
}
