use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShoeboxError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub api_token: String,
    pub data_dir: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub default_account: Option<String>,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_token: String::new(),
            data_dir: default_data_dir().to_string_lossy().to_string(),
            timeout_secs: default_timeout_secs(),
            default_account: None,
        }
    }
}

impl Settings {
    pub fn drafts_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("drafts")
    }
}

/// `SHOEBOX_CONFIG_DIR` overrides the default location so tests and
/// scripted runs never touch the real config.
fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHOEBOX_CONFIG_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("shoebox")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("shoebox")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ShoeboxError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
