//! Deadliner command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from environment and flags.
//! - Start file logging, open the store and run one command.

mod cli;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use deadliner_api::Api;
use deadliner_core::{init_logging, CoreConfig};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let config = resolve_config(&cli_opts)?;

    init_logging(&config.log_level, &config.log_dir)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let mut api = Api::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;
    cli::run(cli_opts.command, cli_opts.json, &mut api)
}

fn resolve_config(cli_opts: &cli::Cli) -> Result<CoreConfig> {
    let mut config = CoreConfig::from_env();
    if let Some(db_path) = &cli_opts.db {
        config.db_path = absolute(db_path)?;
    }
    if let Some(log_dir) = &cli_opts.log_dir {
        config.log_dir = absolute(log_dir)?;
    }
    if let Some(level) = &cli_opts.log_level {
        config.log_level = level.clone();
    }
    // Logging only accepts absolute directories.
    config.log_dir = absolute(&config.log_dir)?;
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}
