use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn shoebox(cfg: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shoebox").unwrap();
    cmd.env("SHOEBOX_CONFIG_DIR", cfg)
        .env("HOME", cfg)
        .env("NO_COLOR", "1");
    cmd
}

fn write_settings(cfg: &Path) {
    let data_dir = cfg.join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let body = serde_json::json!({
        "server_url": "http://127.0.0.1:9",
        "api_token": "",
        "data_dir": data_dir.to_string_lossy(),
        "timeout_secs": 1
    });
    std::fs::write(
        cfg.join("settings.json"),
        serde_json::to_string_pretty(&body).unwrap(),
    )
    .unwrap();
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    shoebox(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("transactions"));
}

#[test]
fn tasks_dry_run_previews_piped_block() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["tasks", "add", "--dry-run"])
        .write_stdin("1. Buy stamps\n2. Mail letter\nwith tracking\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks to create:"))
        .stdout(predicate::str::is_match("(?s)Buy stamps.*Mail letter.*with tracking").unwrap());
}

#[test]
fn tasks_dry_run_reads_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    let block = dir.path().join("todo.txt");
    std::fs::write(&block, "Call plumber\nWater plants\n").unwrap();
    shoebox(dir.path())
        .args(["tasks", "add", "--dry-run"])
        .arg(block.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Call plumber"))
        .stdout(predicate::str::contains("Water plants"));
}

#[test]
fn tasks_with_empty_input_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["tasks", "add", "--dry-run"])
        .write_stdin("\n\n  \n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to create"));
}

#[test]
fn tasks_piped_without_yes_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["tasks", "add"])
        .write_stdin("1. Buy stamps\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --yes or --dry-run"));
}

#[test]
fn transactions_rejects_malformed_month() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["transactions", "--month", "2025-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month '2025-13'"));
}

#[test]
fn drafts_list_is_empty_on_fresh_setup() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["drafts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drafts saved."));
}

#[test]
fn upload_requires_at_least_one_file() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path());
    shoebox(dir.path())
        .args(["upload", "--type", "cash"])
        .assert()
        .failure();
}
