pub mod completions;
pub mod drafts;
pub mod init;
pub mod status;
pub mod tasks;
pub mod transactions;
pub mod upload;

use std::io::Write;

use clap::{Parser, Subcommand};

use crate::client::ApiClient;
use crate::error::{Result, ShoeboxError};
use crate::models::TransactionType;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "shoebox",
    about = "Paste-and-upload ingestion CLI for a self-hosted tasks & budget server.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up shoebox: server address, API token, and a local data directory.
    Init {
        /// Budget server base URL, e.g. http://localhost:3000
        #[arg(long = "server-url")]
        server_url: Option<String>,
        /// API bearer token (leave empty for an open server)
        #[arg(long)]
        token: Option<String>,
        /// Directory for drafts and exports (default: ~/Documents/shoebox)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Create tasks in bulk from pasted or piped text.
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
    /// Upload bank statement files and commit the merged transactions.
    Upload {
        /// Statement files, processed one at a time in the order given
        #[arg(required = true)]
        files: Vec<String>,
        /// Declared type for every file in the batch
        #[arg(long = "type", value_enum)]
        transaction_type: TransactionType,
        /// Destination account identifier (default: from settings)
        #[arg(long)]
        account: Option<String>,
        /// Stage and show the merge without committing
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Skip the commit confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List committed transactions, optionally scoped to one month.
    Transactions {
        /// Month: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Write rows to a CSV file instead of printing a table
        #[arg(long)]
        csv: Option<String>,
    },
    /// Inspect saved input drafts.
    Drafts {
        #[command(subcommand)]
        command: DraftsCommands,
    },
    /// Show configuration and server reachability.
    Status,
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum TasksCommands {
    /// Parse a block of text into task titles and create them in order.
    Add {
        /// Read the block from a file instead of stdin
        file: Option<String>,
        /// Target task list on the server
        #[arg(long)]
        list: Option<String>,
        /// Show the parsed tasks without creating anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Skip the creation confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum DraftsCommands {
    /// List saved drafts.
    List,
    /// Print a draft's full text.
    Show {
        /// Draft key (shown in `shoebox drafts list`)
        key: String,
    },
    /// Delete a draft.
    Clear {
        /// Draft key to delete
        key: Option<String>,
        /// Delete every draft
        #[arg(long)]
        all: bool,
    },
}

/// Validate a YYYY-MM month string, zero-padded.
pub(crate) fn parse_month(month: &str) -> Result<String> {
    let padded = month.len() == 7;
    let parses =
        chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok();
    if padded && parses {
        Ok(month.to_string())
    } else {
        Err(ShoeboxError::InvalidMonth(month.to_string()))
    }
}

pub(crate) fn client_from(settings: &Settings) -> Result<ApiClient> {
    ApiClient::new(
        &settings.server_url,
        &settings.api_token,
        settings.timeout_secs,
    )
}

pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn confirm(label: &str) -> Result<bool> {
    let answer = prompt(&format!("{label} [y/N] "))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
