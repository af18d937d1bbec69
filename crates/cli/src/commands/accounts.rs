use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use sweep_core::db::{
    load_accounts_file, load_workspace_config, save_workspace_config, AccountEntry,
};
use sweep_core::model::RegionDescriptor;
use sweep_core::store::RegionDirectory;
use tracing::info;

use crate::canonicalize_or_current;
use crate::commands::{open_workspace, print_json, workspace_layout};

#[derive(Serialize)]
pub struct AccountRegions {
    pub account: String,
    pub regions: Vec<RegionDescriptor>,
}

/// Register one account in the workspace config.
pub fn add_account_command(root: &str, id: &str, name: &str, default: bool) -> Result<()> {
    let layout = workspace_layout(root)?;
    let mut config = load_workspace_config(&layout)?;

    let entry = AccountEntry { id: id.to_string(), name: name.to_string(), default };
    config.add_account(entry)?;
    save_workspace_config(&layout, &config)?;
    info!(account = name, "added account");

    println!("Added account:");
    println!("  Id: {}", id);
    println!("  Name: {}", name);
    println!("  Default: {}", if default { "yes" } else { "no" });
    Ok(())
}

/// Import accounts from a YAML or JSON accounts file.
///
/// Accounts that are already configured (by name or id) are skipped.
pub fn import_accounts_command(root: &str, file: &str) -> Result<()> {
    let layout = workspace_layout(root)?;
    let mut config = load_workspace_config(&layout)?;

    let file_path = canonicalize_or_current(file)?;
    let entries = load_accounts_file(Path::new(&file_path))?;
    if entries.is_empty() {
        return Err(anyhow!("No accounts found in {}", file_path.display()));
    }

    let mut added = 0usize;
    let mut skipped = Vec::new();
    for entry in entries {
        if config.find_account(&entry.name).is_some() || config.find_account(&entry.id).is_some() {
            skipped.push(entry.name);
            continue;
        }
        config.add_account(entry)?;
        added += 1;
    }
    save_workspace_config(&layout, &config)?;
    info!(added, skipped = skipped.len(), "imported accounts");

    println!("Imported {} account(s) from {}", added, file_path.display());
    if !skipped.is_empty() {
        println!("Skipped (already configured): {}", skipped.join(", "));
    }
    Ok(())
}

/// List configured accounts.
pub fn list_accounts_command(root: &str, json: bool) -> Result<()> {
    let layout = workspace_layout(root)?;
    let config = load_workspace_config(&layout)?;

    if json {
        return print_json(&config.accounts);
    }

    println!("Accounts ({}):", config.accounts.len());
    if config.accounts.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for account in &config.accounts {
        let marker = if account.default { " [default]" } else { "" };
        println!("  - {} ({}){}", account.name, account.id, marker);
    }
    Ok(())
}

/// List the regions cached for one account.
pub fn list_regions_command(root: &str, account: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let entry = ctx
        .config
        .find_account(account)
        .ok_or_else(|| anyhow!("Unknown account '{}'", account))?;
    let account = entry.to_account();

    let store = ctx.store();
    let regions = store
        .regions(&account)
        .with_context(|| format!("Failed to read regions for account '{}'", account.name))?;

    if json {
        return print_json(&AccountRegions { account: account.name, regions });
    }

    println!("Regions for {} ({}):", account.name, regions.len());
    if regions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for region in &regions {
        match &region.endpoint {
            Some(endpoint) => println!("  - {} ({})", region.region_name, endpoint),
            None => println!("  - {}", region.region_name),
        }
    }
    Ok(())
}
