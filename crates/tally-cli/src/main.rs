//! Tally CLI - Command-line host for the Tally billing core
//!
//! Inspect the local billing database and reconcile it with the cloud.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_remote_config, open_session, resolve_db_path};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::export::run_export;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
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

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "tally=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let db_path = resolve_db_path(cli.db_path)?;
    let remote_config = load_remote_config()?;
    let auto_sync = !cli.no_auto_sync && matches!(
        cli.command,
        Commands::Status { .. } | Commands::Export { .. }
    );
    let session = open_session(&db_path, remote_config, auto_sync).await?;

    match cli.command {
        Commands::Sync { json } => run_sync(&session, json).await?,
        Commands::Status { json } => run_status(&session, json).await?,
        Commands::Export { output } => run_export(session.db(), output.as_deref()).await?,
        Commands::Config { command } => run_config(command, session.db()).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
