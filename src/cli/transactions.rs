use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{client_from, parse_month};
use crate::error::Result;
use crate::fallback::load_period;
use crate::fmt::money;
use crate::models::TransactionRecord;
use crate::settings::load_settings;

pub async fn run(month: Option<String>, csv: Option<String>) -> Result<()> {
    let requested = match month {
        Some(m) => Some(parse_month(&m)?),
        None => None,
    };

    let settings = load_settings();
    let client = client_from(&settings)?;
    let view = load_period(&client, requested.as_deref()).await;

    if let (Some(req), None) = (requested.as_deref(), view.period.as_deref()) {
        println!(
            "{}",
            format!("Could not load {req} on its own; showing all months instead.").yellow()
        );
    }

    if let Some(path) = csv {
        write_csv(&path, &view.transactions)?;
        println!("Wrote {} rows to {path}", view.transactions.len());
        return Ok(());
    }

    let title = match view.period.as_deref() {
        Some(p) => format!("Transactions for {p}"),
        None => "All transactions".to_string(),
    };
    if view.transactions.is_empty() {
        println!("{title}: none found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Category"]);
    for t in &view.transactions {
        let amount = if t.amount < 0.0 {
            money(t.amount).red().to_string()
        } else {
            money(t.amount).green().to_string()
        };
        table.add_row(vec![
            Cell::new(t.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(amount),
            Cell::new(t.category.as_deref().unwrap_or("")),
        ]);
    }
    println!("{title}\n{table}");

    let total: f64 = view.transactions.iter().map(|t| t.amount).sum();
    println!("{} transactions, net {}", view.transactions.len(), money(total));
    Ok(())
}

fn write_csv(path: &str, rows: &[TransactionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "description", "amount", "category"])?;
    for t in rows {
        let amount = format!("{:.2}", t.amount);
        writer.write_record([
            t.date.as_str(),
            t.description.as_str(),
            amount.as_str(),
            t.category.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
