use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{client_from, confirm};
use crate::error::{Result, ShoeboxError};
use crate::fmt::{money, percent};
use crate::models::{TransactionRecord, TransactionType};
use crate::settings::load_settings;
use crate::uploader::upload_statements;

const PREVIEW_ROWS: usize = 15;

pub async fn run(
    files: &[String],
    declared: TransactionType,
    account: Option<String>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let settings = load_settings();
    let client = client_from(&settings)?;
    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();

    let outcome = upload_statements(&client, &paths, declared, |i, n, name| {
        println!("Uploading file {i} of {n}: {name}");
    })
    .await?;

    println!();
    println!("{}", outcome.summary().bold());
    for failure in &outcome.failures {
        println!(
            "{}",
            format!("  skipped {}: {}", failure.file_name, failure.message).yellow()
        );
    }

    let merged = &outcome.merged;
    println!(
        "Month: {}   Profile: {} ({} confidence)",
        merged.month_year,
        merged.normalizer_profile,
        percent(merged.normalizer_confidence)
    );
    if let (Some(lo), Some(hi)) = (
        merged.transactions.iter().map(|t| t.date.as_str()).min(),
        merged.transactions.iter().map(|t| t.date.as_str()).max(),
    ) {
        println!("Dates: {lo} to {hi}");
    }
    println!("Total: {}", money(merged.total_amount));
    println!();
    print_staged(&merged.transactions);

    if dry_run {
        println!("Dry run: nothing committed.");
        return Ok(());
    }

    if !yes {
        if !atty::is(atty::Stream::Stdin) {
            return Err(ShoeboxError::Other(
                "cannot confirm from a non-interactive session; pass --yes or --dry-run"
                    .to_string(),
            ));
        }
        let n = merged.transactions.len();
        if !confirm(&format!("Commit {n} transaction{}?", if n == 1 { "" } else { "s" }))? {
            println!("Discarded staged upload; nothing committed.");
            return Ok(());
        }
    }

    let account_id = account.or_else(|| settings.default_account.clone());
    let receipt = client
        .commit_transactions(&merged.transactions, account_id.as_deref())
        .await?;
    println!("{}", receipt.message.green());
    Ok(())
}

fn print_staged(transactions: &[TransactionRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount"]);
    for t in transactions.iter().take(PREVIEW_ROWS) {
        let amount = if t.amount < 0.0 {
            money(t.amount).red().to_string()
        } else {
            money(t.amount).green().to_string()
        };
        table.add_row(vec![
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(amount),
        ]);
    }
    println!("Staged transactions\n{table}");
    if transactions.len() > PREVIEW_ROWS {
        println!("... and {} more", transactions.len() - PREVIEW_ROWS);
    }
}
