//! `labnote` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, start optional file logging and open the notebook.
//! - Hand the command to [`commands::dispatch`].
//!
//! # Invariants
//! - Destructive commands require `--yes`.
//! - Errors are printed once, with their cause chain, and exit with status 1.

use anyhow::Context;
use clap::Parser;
use labnote_core::{default_log_level, LabRepository, SqliteKvStore};

mod cli;
mod commands;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("labnote error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    start_logging(&cli)?;

    let store = SqliteKvStore::open(&cli.db)
        .with_context(|| format!("failed to open notebook `{}`", cli.db.display()))?;
    let repo = LabRepository::new(store);
    commands::dispatch(cli.command, &repo).await
}

fn start_logging(cli: &cli::Cli) -> anyhow::Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(log_dir)
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    labnote_core::init_logging(level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)
}
