use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use sweep_core::db::{findings_from_reports, ScanRunRecord, ScanRunStatus};
use sweep_core::graph::SnapshotGraphBuilder;
use sweep_core::model::Account;
use sweep_core::scan::{finding_count, region_count, AccountReport, Scanner};
use tracing::{error, info};
use walkdir::WalkDir;

use crate::commands::{open_workspace, parse_account_selection, print_json};
use crate::sha256_file;

/// Options for a scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Comma-separated account names/ids, or `all`.
    pub accounts: Option<String>,
    pub json: bool,
    /// Extra path to write the JSON report to.
    pub output: Option<String>,
    /// Skip recording the run in the scan history.
    pub no_record: bool,
}

/// Run every detector over the selected accounts and report unused resources.
pub fn scan_command(root: &str, opts: &ScanOptions) -> Result<()> {
    let ctx = open_workspace(root)?;
    let selection = parse_account_selection(opts.accounts.as_deref());
    let accounts = ctx.config.select_accounts(&selection)?;
    let data_dir = ctx.data_dir();

    let started_at = Utc::now().to_rfc3339();
    let data_digest = snapshot_digest(&data_dir, &accounts)?;
    info!(accounts = accounts.len(), data_dir = %data_dir.display(), "starting scan");

    let store = ctx.store();
    let graph = SnapshotGraphBuilder::new(&store);
    let scanner = Scanner::new(&store, &store, &graph);
    let account_names: Vec<String> = accounts.iter().map(|a| a.name.clone()).collect();

    let reports = match scanner.run(&accounts) {
        Ok(reports) => reports,
        Err(err) => {
            error!(error = %err, "scan failed");
            if !opts.no_record {
                let record = ScanRunRecord {
                    id: None,
                    started_at,
                    finished_at: Utc::now().to_rfc3339(),
                    status: ScanRunStatus::Failed,
                    accounts: account_names,
                    regions: 0,
                    findings: 0,
                    data_digest: Some(data_digest),
                    error: Some(err.to_string()),
                };
                ctx.db.insert_scan_run(&record).context("Failed to record failed scan run")?;
            }
            return Err(err).context("Scan failed");
        }
    };

    let body = serde_json::to_string_pretty(&reports).context("Failed to serialize report")?;
    let mut report_path: Option<PathBuf> = None;

    if !opts.no_record {
        let findings = findings_from_reports(&reports).context("Failed to flatten findings")?;
        let record = ScanRunRecord {
            id: None,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            status: ScanRunStatus::Succeeded,
            accounts: account_names,
            regions: region_count(&reports) as i64,
            findings: findings.len() as i64,
            data_digest: Some(data_digest),
            error: None,
        };
        let run_id = ctx.db.record_scan(&record, &findings).context("Failed to record scan run")?;

        let path = ctx.layout.report_path(run_id);
        write_report(&path, &body)?;
        info!(run_id, report = %path.display(), "recorded scan");
        report_path = Some(path);
    }

    if let Some(output) = &opts.output {
        write_report(Path::new(output), &body)?;
    }

    if opts.json {
        return print_json(&reports);
    }

    print!("{}", render_report(&reports));
    if let Some(path) = report_path {
        println!("Report written to {}", path.display());
    }
    if let Some(output) = &opts.output {
        println!("Report written to {}", output);
    }
    Ok(())
}

/// Human-readable rendering of a full report.
pub fn render_report(reports: &[AccountReport]) -> String {
    let mut out = String::new();
    for account in reports {
        let _ = writeln!(out, "Account {} ({})", account.account.name, account.account.id);
        if account.regions.is_empty() {
            let _ = writeln!(out, "  (no regions)");
        }
        for region in &account.regions {
            if region.unused_resources.is_empty() {
                let _ = writeln!(out, "  {}: no unused resources", region.region);
                continue;
            }
            let _ = writeln!(out, "  {}:", region.region);
            for (kind, resources) in &region.unused_resources {
                let _ = writeln!(out, "    {} ({}):", kind.label(), resources.len());
                for resource in resources {
                    let _ = writeln!(out, "      - {}", resource.summary());
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "Total: {} unused resource(s) in {} region(s)",
        finding_count(reports),
        region_count(reports)
    );
    out
}

fn write_report(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report dir: {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("Failed to write report: {}", path.display()))
}

/// SHA-256 over every snapshot file of the given accounts, in sorted path order.
///
/// Each file contributes its path relative to `data_dir` and its own hash, so
/// renames and content changes both change the digest.
pub fn snapshot_digest(data_dir: &Path, accounts: &[Account]) -> Result<String> {
    let mut hasher = Sha256::new();
    for account in accounts {
        let dir = data_dir.join(&account.name);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(data_dir).unwrap_or(entry.path());
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update(b"\0");
            hasher.update(sha256_file(entry.path())?.as_bytes());
            hasher.update(b"\n");
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}
