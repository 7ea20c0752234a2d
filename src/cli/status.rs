use colored::Colorize;

use crate::cli::client_from;
use crate::drafts::{DraftStore, FileDraftStore, DRAFT_KEYS};
use crate::error::Result;
use crate::settings::{load_settings, settings_file_exists};

pub async fn run() -> Result<()> {
    let settings = load_settings();

    println!("Server:     {}", settings.server_url);
    println!(
        "Token:      {}",
        if settings.api_token.is_empty() {
            "(none)"
        } else {
            "(set)"
        }
    );
    println!("Data dir:   {}", settings.data_dir);
    println!(
        "Account:    {}",
        settings.default_account.as_deref().unwrap_or("(none)")
    );

    if !settings_file_exists() {
        println!();
        println!("No settings file found. Run `shoebox init` to set up.");
        return Ok(());
    }

    let client = client_from(&settings)?;
    let health = if client.health().await {
        "reachable".green().to_string()
    } else {
        "unreachable".red().to_string()
    };
    println!("Health:     {health}");

    let store = FileDraftStore::new(settings.drafts_dir());
    let saved: Vec<&str> = DRAFT_KEYS
        .iter()
        .copied()
        .filter(|key| store.load(key).is_some())
        .collect();
    println!(
        "Drafts:     {}",
        if saved.is_empty() {
            "none".to_string()
        } else {
            saved.join(", ")
        }
    );

    Ok(())
}
