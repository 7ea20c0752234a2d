use comfy_table::{Cell, Table};

use crate::drafts::{DraftStore, FileDraftStore, DRAFT_KEYS};
use crate::error::{Result, ShoeboxError};
use crate::settings::load_settings;

fn open_store() -> FileDraftStore {
    FileDraftStore::new(load_settings().drafts_dir())
}

pub fn list() -> Result<()> {
    let store = open_store();
    let mut table = Table::new();
    table.set_header(vec!["Key", "Lines", "Preview"]);
    let mut found = false;
    for key in DRAFT_KEYS.iter().copied() {
        if let Some(text) = store.load(key) {
            found = true;
            let preview: String = text.lines().next().unwrap_or("").chars().take(48).collect();
            table.add_row(vec![
                Cell::new(key),
                Cell::new(text.lines().count()),
                Cell::new(preview),
            ]);
        }
    }
    if found {
        println!("Drafts\n{table}");
    } else {
        println!("No drafts saved.");
    }
    Ok(())
}

pub fn show(key: &str) -> Result<()> {
    let store = open_store();
    match store.load(key) {
        Some(text) => println!("{text}"),
        None => println!("No draft under '{key}'."),
    }
    Ok(())
}

pub fn clear(key: Option<String>, all: bool) -> Result<()> {
    let store = open_store();
    if all {
        for key in DRAFT_KEYS.iter().copied() {
            store.clear(key);
        }
        println!("Cleared all drafts.");
        return Ok(());
    }
    match key {
        Some(key) => {
            store.clear(&key);
            println!("Cleared draft '{key}'.");
            Ok(())
        }
        None => Err(ShoeboxError::Other(
            "pass a draft key or --all".to_string(),
        )),
    }
}
