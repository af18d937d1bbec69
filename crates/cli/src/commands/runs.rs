use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use sweep_core::db::{FindingRecord, ScanRunRecord};

use crate::commands::{open_workspace, print_json};

#[derive(Serialize)]
pub struct ScanRunDetail {
    pub run: ScanRunRecord,
    pub report_path: Option<String>,
    pub findings: Vec<FindingRecord>,
}

/// List recorded scan runs.
pub fn list_runs_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let runs = ctx.db.list_scan_runs().context("Failed to list scan runs")?;

    if json {
        return print_json(&runs);
    }

    println!("Scan runs ({}):", runs.len());
    if runs.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for run in &runs {
        println!(
            "  - #{} [{}] {} accounts={} regions={} findings={}",
            run.id.unwrap_or_default(),
            run.status.as_str(),
            run.started_at,
            run.accounts.join(","),
            run.regions,
            run.findings
        );
    }
    Ok(())
}

/// Show one scan run and its recorded findings.
pub fn show_run_command(root: &str, id: i64, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let run = ctx
        .db
        .get_scan_run(id)
        .context("Failed to load scan run")?
        .ok_or_else(|| anyhow!("Scan run {} not found", id))?;
    let findings = ctx.db.list_findings(id).context("Failed to list findings")?;
    let report = ctx.layout.report_path(id);
    let report_path = report.exists().then(|| report.display().to_string());

    if json {
        return print_json(&ScanRunDetail { run, report_path, findings });
    }

    println!("Scan run #{}", id);
    println!("  Status: {}", run.status.as_str());
    println!("  Started: {}", run.started_at);
    println!("  Finished: {}", run.finished_at);
    println!("  Accounts: {}", run.accounts.join(", "));
    println!("  Regions: {}", run.regions);
    println!("  Findings: {}", run.findings);
    if let Some(digest) = &run.data_digest {
        println!("  Data digest: {}", digest);
    }
    if let Some(err) = &run.error {
        println!("  Error: {}", err);
    }
    if let Some(path) = &report_path {
        println!("  Report: {}", path);
    }
    if !findings.is_empty() {
        println!();
        for f in &findings {
            println!(
                "  - {}/{} {} {}",
                f.account_name,
                f.region,
                f.resource_type.as_str(),
                f.resource_id
            );
        }
    }
    Ok(())
}
