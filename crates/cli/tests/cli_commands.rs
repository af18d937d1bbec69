use std::fs;
use std::path::Path;

use predicates::prelude::*;
use serde_json::json;
use sweep_core::db::WorkspaceLayout;
use tempfile::tempdir;

fn sweep() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("orphan-sweep")
}

fn write_json(path: &Path, body: serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body.to_string()).unwrap();
}

/// Running the CLI without a subcommand prints usage and fails.
#[test]
fn missing_subcommand_fails() {
    sweep().assert().failure().stderr(predicate::str::contains("Usage"));
}

/// init without --root uses the current directory.
#[test]
fn init_uses_current_directory_by_default() {
    let dir = tempdir().expect("tempdir");
    sweep()
        .current_dir(dir.path())
        .args(["init", "--name", "TestWorkspace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized orphan-sweep workspace"));

    let layout = WorkspaceLayout::new(dir.path());
    assert!(layout.config_path.exists(), "config should exist at {}", layout.config_path.display());
}

/// info should fail (non-zero exit) if no workspace config exists.
#[test]
fn info_fails_when_config_missing() {
    let dir = tempdir().expect("tempdir");
    sweep()
        .arg("info")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read workspace config"));
}

/// Full flow: init, add an account, scan cached data, inspect history.
#[test]
fn scan_reports_unused_resources_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    sweep().arg("init").arg("--root").arg(root).assert().success();
    sweep()
        .args(["add-account", "--id", "111122223333", "--name", "prod"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();

    let data = WorkspaceLayout::new(root).data_dir.join("prod");
    write_json(&data.join("describe-regions.json"), json!({"Regions": [{"RegionName": "eu-west-1"}]}));
    write_json(
        &data.join("eu-west-1/ec2-describe-addresses.json"),
        json!({"Addresses": [{"PublicIp": "203.0.113.7"}]}),
    );
    write_json(
        &data.join("eu-west-1/elb-describe-load-balancers.json"),
        json!({"LoadBalancerDescriptions": [{"LoadBalancerName": "legacy", "Instances": []}]}),
    );

    sweep()
        .arg("list-regions")
        .arg("--root")
        .arg(root)
        .args(["--account", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eu-west-1"));

    let assert = sweep()
        .arg("--quiet")
        .arg("scan")
        .arg("--root")
        .arg(root)
        .arg("--json")
        .assert()
        .success();
    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("scan JSON");
    assert_eq!(
        report,
        json!([{
            "account": {"id": "111122223333", "name": "prod"},
            "regions": [{
                "region": "eu-west-1",
                "unused_resources": {
                    "elastic_ips": [{"id": "Un-allocated IP", "ip": "203.0.113.7"}],
                    "elastic_load_balancers": [{"LoadBalancerName": "legacy", "Type": "classic"}]
                }
            }]
        }])
    );

    sweep()
        .arg("runs")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 [succeeded]"));

    sweep()
        .arg("show-run")
        .arg("--root")
        .arg(root)
        .args(["--id", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elastic_load_balancers legacy"));

    assert!(WorkspaceLayout::new(root).report_path(1).exists());
}

/// Human output names each region and the totals.
#[test]
fn scan_human_output_lists_findings() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    sweep().arg("init").arg("--root").arg(root).assert().success();
    sweep()
        .args(["add-account", "--id", "1", "--name", "dev"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
    let data = WorkspaceLayout::new(root).data_dir.join("dev");
    write_json(&data.join("describe-regions.json"), json!({"Regions": [{"RegionName": "us-east-1"}]}));
    write_json(
        &data.join("us-east-1/ec2-describe-network-interfaces.json"),
        json!({"NetworkInterfaces": [{"NetworkInterfaceId": "eni-9", "Status": "available"}]}),
    );

    sweep()
        .arg("scan")
        .arg("--root")
        .arg(root)
        .arg("--no-record")
        .assert()
        .success()
        .stdout(predicate::str::contains("Network interfaces (1)"))
        .stdout(predicate::str::contains("- eni-9"))
        .stdout(predicate::str::contains("Total: 1 unused resource(s) in 1 region(s)"));
}

/// Scanning with no accounts configured is an error.
#[test]
fn scan_without_accounts_fails() {
    let dir = tempdir().expect("tempdir");
    sweep().arg("init").arg("--root").arg(dir.path()).assert().success();
    sweep()
        .arg("scan")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No accounts configured"));
}

/// Corrupt snapshot data aborts the scan with a non-zero exit.
#[test]
fn scan_fails_on_corrupt_snapshot() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    sweep().arg("init").arg("--root").arg(root).assert().success();
    sweep()
        .args(["add-account", "--id", "1", "--name", "dev"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
    let data = WorkspaceLayout::new(root).data_dir.join("dev");
    write_json(&data.join("describe-regions.json"), json!({"Regions": [{"RegionName": "us-east-1"}]}));
    fs::create_dir_all(data.join("us-east-1")).unwrap();
    fs::write(data.join("us-east-1/ec2-describe-volumes.json"), "{").unwrap();

    sweep()
        .arg("scan")
        .arg("--root")
        .arg(root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scan failed"));
}
