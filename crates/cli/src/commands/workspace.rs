use std::fs;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use sweep_core::db::{
    save_workspace_config, ScanDb, ScanRunRecord, WorkspaceConfig, WorkspaceLayout,
};

use crate::commands::{open_workspace, print_dir_status, print_json};
use crate::{canonicalize_or_current, infer_workspace_name};

#[derive(Serialize)]
pub struct WorkspaceInfoSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub data_dir: String,
    pub reports_dir: String,
    pub accounts: usize,
    pub scan_runs: usize,
    pub last_run: Option<ScanRunRecord>,
}

/// Initialize a new workspace at `root`.
pub fn init_workspace_command(
    root: &str,
    name: Option<String>,
    data_dir: Option<String>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = WorkspaceLayout::new(&root_path);

    if layout.config_path.exists() {
        return Err(anyhow!(
            "Workspace already initialized: {} exists",
            layout.config_path.display()
        ));
    }

    let workspace_name = match name {
        Some(n) => n,
        None => infer_workspace_name(&root_path),
    };
    let data_dir = data_dir.unwrap_or_else(|| layout.data_dir_relative_string());
    let data_path = layout.resolve(&data_dir);

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;
    fs::create_dir_all(&data_path)
        .with_context(|| format!("Failed to create data dir: {}", data_path.display()))?;

    let config = WorkspaceConfig::new(&workspace_name, layout.db_path_relative_string(), data_dir);
    save_workspace_config(&layout, &config)?;

    // Create the database now so follow-on commands can rely on its presence.
    ScanDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize scan database at {}", layout.db_path.display())
    })?;

    println!("Initialized orphan-sweep workspace:");
    println!("  Name: {}", workspace_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Data dir: {}", data_path.display());
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(())
}

/// Show basic information about an existing workspace.
pub fn workspace_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let runs = ctx.db.list_scan_runs().context("Failed to list scan runs")?;
    let data_dir = ctx.data_dir();

    if json {
        let snapshot = WorkspaceInfoSnapshot {
            name: ctx.config.name.clone(),
            description: ctx.config.description.clone(),
            root: ctx.layout.root.display().to_string(),
            config_file: ctx.layout.config_path.display().to_string(),
            config_version: ctx.config.config_version.clone(),
            db_path: ctx.config.db.path.clone(),
            data_dir: data_dir.display().to_string(),
            reports_dir: ctx.layout.reports_dir.display().to_string(),
            accounts: ctx.config.accounts.len(),
            scan_runs: runs.len(),
            last_run: runs.last().cloned(),
        };
        return print_json(&snapshot);
    }

    println!("orphan-sweep Workspace Info");
    println!("===========================");
    println!("Name: {}", ctx.config.name);
    if let Some(desc) = &ctx.config.description {
        println!("Description: {}", desc);
    }
    println!("Root: {}", ctx.layout.root.display());
    println!("Config file: {}", ctx.layout.config_path.display());
    println!("Config version: {}", ctx.config.config_version);
    println!("DB path (config): {}", ctx.config.db.path);
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.sweep)", &ctx.layout.meta_dir);
    print_dir_status("Data dir", &data_dir);
    print_dir_status("Reports dir", &ctx.layout.reports_dir);
    println!();

    println!("Accounts: {}", ctx.config.accounts.len());
    println!("Scan runs: {}", runs.len());
    if let Some(last) = runs.last() {
        println!(
            "Last run: #{} [{}] {} ({} findings)",
            last.id.unwrap_or_default(),
            last.status.as_str(),
            last.finished_at,
            last.findings
        );
    }

    Ok(())
}
