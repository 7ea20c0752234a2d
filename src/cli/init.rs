use crate::cli::prompt;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(
    server_url: Option<String>,
    token: Option<String>,
    data_dir: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();

    settings.server_url = match server_url {
        Some(url) => url,
        None => {
            let current = settings.server_url.clone();
            let input = prompt(&format!("Server URL [{current}]: "))?;
            if input.is_empty() {
                current
            } else {
                input
            }
        }
    }
    .trim_end_matches('/')
    .to_string();

    settings.api_token = match token {
        Some(t) => t,
        None => {
            let shown = if settings.api_token.is_empty() {
                "none".to_string()
            } else {
                "kept".to_string()
            };
            let input = prompt(&format!("API token [{shown}]: "))?;
            if input.is_empty() {
                settings.api_token.clone()
            } else {
                input
            }
        }
    };

    settings.data_dir = match data_dir {
        Some(dir) => shellexpand_path(&dir),
        None => {
            let current = settings.data_dir.clone();
            let input = prompt(&format!("Data directory [{current}]: "))?;
            if input.is_empty() {
                current
            } else {
                shellexpand_path(&input)
            }
        }
    };

    std::fs::create_dir_all(&settings.data_dir)?;
    save_settings(&settings)?;

    println!("Initialized shoebox; data in {}", settings.data_dir);
    println!("Run `shoebox status` to check the server connection.");
    Ok(())
}
