//! Dispatches the parsed command line to its handler

use super::handlers::{migrate, seed, serve};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// Runs the selected subcommand. Without one, the server starts.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })?;

    match &cli.command {
        None => serve::run(settings, false).await,
        Some(Commands::Serve { dry_run, .. }) => serve::run(settings, *dry_run).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            migrate::run(&settings, *dry_run, *rollback).await
        }
        Some(Commands::Seed) => seed::run(&settings).await,
    }
}
