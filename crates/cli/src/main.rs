use anyhow::Result;
use clap::{Parser, Subcommand};
use orphan_sweep::commands::{
    add_account_command, import_accounts_command, init_workspace_command, list_accounts_command,
    list_regions_command, list_runs_command, scan_command, show_run_command,
    workspace_info_command, ScanOptions,
};
use orphan_sweep::logging::init_logging;

/// Offline detector for unused cloud resources in cached account snapshots.
///
/// This CLI is a thin wrapper around `sweep-core` (exposed in code as `sweep_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "orphan-sweep",
    version,
    about = "Find unused cloud resources in cached account snapshots",
    long_about = None
)]
struct Cli {
    /// Only log errors.
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug events (per snapshot lookup and detector).
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit log events as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new workspace at the given root.
    ///
    /// This will:
    /// - Create a `.sweep` metadata directory, `account-data/` and `reports/`.
    /// - Write a `.sweep/config.json` config file.
    /// - Create the scan history database.
    Init {
        /// Workspace root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional workspace name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Snapshot directory (relative to root or absolute). Defaults to `account-data`.
        #[arg(long)]
        data_dir: Option<String>,
    },

    /// Show basic information about an existing workspace.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Register an account in the workspace config.
    AddAccount {
        #[arg(long, default_value = ".")]
        root: String,

        /// Account identifier.
        #[arg(long)]
        id: String,

        /// Account name; also the directory name under the data dir.
        #[arg(long)]
        name: String,

        /// Scan this account when no accounts are selected.
        #[arg(long, default_value_t = false)]
        default: bool,
    },

    /// Import accounts from a YAML or JSON file (`accounts: [{id, name, default}]`).
    ImportAccounts {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        file: String,
    },

    /// List configured accounts.
    ListAccounts {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the regions cached for an account.
    ListRegions {
        #[arg(long, default_value = ".")]
        root: String,

        /// Account name or id.
        #[arg(long)]
        account: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan cached snapshots for unused resources.
    Scan {
        #[arg(long, default_value = ".")]
        root: String,

        /// Comma-separated account names/ids, or `all`.
        #[arg(long)]
        accounts: Option<String>,

        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(long)]
        output: Option<String>,

        /// Do not record the run in the scan history.
        #[arg(long, default_value_t = false)]
        no_record: bool,
    },

    /// List recorded scan runs.
    Runs {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show one recorded scan run and its findings.
    ShowRun {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        id: i64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose, cli.log_json);

    match cli.command {
        Command::Init { root, name, data_dir } => init_workspace_command(&root, name, data_dir)?,
        Command::Info { root, json } => workspace_info_command(&root, json)?,
        Command::AddAccount { root, id, name, default } => {
            add_account_command(&root, &id, &name, default)?
        }
        Command::ImportAccounts { root, file } => import_accounts_command(&root, &file)?,
        Command::ListAccounts { root, json } => list_accounts_command(&root, json)?,
        Command::ListRegions { root, account, json } => {
            list_regions_command(&root, &account, json)?
        }
        Command::Scan { root, accounts, json, output, no_record } => {
            scan_command(&root, &ScanOptions { accounts, json, output, no_record })?
        }
        Command::Runs { root, json } => list_runs_command(&root, json)?,
        Command::ShowRun { root, id, json } => show_run_command(&root, id, json)?,
    }

    Ok(())
}
