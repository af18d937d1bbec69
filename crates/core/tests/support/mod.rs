#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use sweep_core::graph::{GraphError, GraphFilter, NodeMap, ResourceGraphBuilder};
use sweep_core::model::{Account, Region};
use sweep_core::store::{encode_parameter, FsResourceStore};
use tempfile::TempDir;

/// A temp data directory laid out the way `FsResourceStore` expects.
pub struct Fixture {
    pub dir: TempDir,
    pub store: FsResourceStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsResourceStore::new(dir.path());
        Self { dir, store }
    }

    pub fn account_dir(&self, account: &Account) -> PathBuf {
        self.dir.path().join(&account.name)
    }

    /// Write `describe-regions.json` for an account.
    pub fn regions(&self, account: &Account, names: &[&str]) {
        let regions: Vec<Value> = names.iter().map(|n| json!({ "RegionName": n })).collect();
        self.write_raw(
            self.account_dir(account).join("describe-regions.json"),
            &json!({ "Regions": regions }).to_string(),
        );
    }

    pub fn query(&self, region: &Region, query: &str, body: Value) {
        self.query_raw(region, query, &body.to_string());
    }

    pub fn query_raw(&self, region: &Region, query: &str, body: &str) {
        let path = self.account_dir(&region.account).join(&region.name).join(format!("{query}.json"));
        self.write_raw(path, body);
    }

    pub fn parameter(&self, region: &Region, service: &str, function: &str, param: &str, body: Value) {
        self.parameter_raw(region, service, function, param, &body.to_string());
    }

    pub fn parameter_raw(&self, region: &Region, service: &str, function: &str, param: &str, body: &str) {
        let path = self
            .account_dir(&region.account)
            .join(&region.name)
            .join(format!("{service}-{function}"))
            .join(encode_parameter(param));
        self.write_raw(path, body);
    }

    /// Register a v2 load balancer with one target group per entry of `target_counts`.
    pub fn v2_load_balancer(&self, region: &Region, name: &str, target_counts: &[usize]) {
        let lb_arn = format!("arn:aws:elasticloadbalancing:{}:lb/{name}", region.name);
        let groups: Vec<Value> = target_counts
            .iter()
            .enumerate()
            .map(|(idx, _)| json!({ "TargetGroupArn": format!("{lb_arn}/tg{idx}") }))
            .collect();
        self.parameter(region, "elbv2", "describe-target-groups", &lb_arn, json!({ "TargetGroups": groups }));
        for (idx, count) in target_counts.iter().enumerate() {
            let descriptions: Vec<Value> = (0..*count)
                .map(|n| json!({ "Target": { "Id": format!("i-{n}") }, "TargetHealth": { "State": "healthy" } }))
                .collect();
            self.parameter(
                region,
                "elbv2",
                "describe-target-health",
                &format!("{lb_arn}/tg{idx}"),
                json!({ "TargetHealthDescriptions": descriptions }),
            );
        }
    }

    fn write_raw(&self, path: PathBuf, body: &str) {
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, body).expect("write fixture");
    }
}

pub fn account() -> Account {
    Account::new("111122223333", "prod")
}

pub fn region(name: &str) -> Region {
    Region::named(account(), name)
}

pub fn lb_arn(region: &Region, name: &str) -> String {
    format!("arn:aws:elasticloadbalancing:{}:lb/{name}", region.name)
}

/// Graph builder returning a fixed node map per region name.
#[derive(Default)]
pub struct StaticGraph {
    pub nodes: HashMap<String, NodeMap>,
}

impl ResourceGraphBuilder for StaticGraph {
    fn build(&self, region: &Region, _filter: &GraphFilter) -> Result<NodeMap, GraphError> {
        Ok(self.nodes.get(&region.name).cloned().unwrap_or_default())
    }
}
