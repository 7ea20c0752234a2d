mod cli;
mod client;
mod drafts;
mod error;
mod fallback;
mod fmt;
mod models;
mod parser;
mod settings;
mod uploader;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DraftsCommands, TasksCommands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            server_url,
            token,
            data_dir,
        } => cli::init::run(server_url, token, data_dir),
        Commands::Tasks { command } => match command {
            TasksCommands::Add {
                file,
                list,
                dry_run,
                yes,
            } => cli::tasks::run(file, list, dry_run, yes).await,
        },
        Commands::Upload {
            files,
            transaction_type,
            account,
            dry_run,
            yes,
        } => cli::upload::run(&files, transaction_type, account, dry_run, yes).await,
        Commands::Transactions { month, csv } => cli::transactions::run(month, csv).await,
        Commands::Drafts { command } => match command {
            DraftsCommands::List => cli::drafts::list(),
            DraftsCommands::Show { key } => cli::drafts::show(&key),
            DraftsCommands::Clear { key, all } => cli::drafts::clear(key, all),
        },
        Commands::Status => cli::status::run().await,
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
