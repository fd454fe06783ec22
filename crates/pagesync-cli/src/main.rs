//! pagesync CLI - post CMS entries to a social media page
//!
//! Triggered once per saved entry; keeps a local record of what was posted.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::forget::run_forget;
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::config::{credential_from_env, default_config_path, CliConfig};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "pagesync=info"
        .parse()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = CliConfig::load_from_path(&config_path)?.with_env(|key| std::env::var(key).ok());
    let db_path = config.resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Sync { entry, json } => {
            let credential = credential_from_env(|key| std::env::var(key).ok())?;
            run_sync(&entry, json, &config, credential, &db_path).await?;
        }
        Commands::Show { entry_id, json } => run_show(entry_id, json, &db_path).await?,
        Commands::Forget { remote_post_id } => run_forget(&remote_post_id, &db_path).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
