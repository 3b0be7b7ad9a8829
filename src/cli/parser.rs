//! Command line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::validation;
use crate::config::Environment;

#[derive(Parser, Debug)]
#[command(name = "taller-rs", version = crate::clap_long_version())]
#[command(about = "Taller REST API: employees, accounts and catalogs over PostgreSQL")]
#[command(after_help = "\
Without a subcommand the server starts as with `serve`.

  taller-rs serve --host 0.0.0.0 --port 8080
  taller-rs --env prod migrate --dry-run
  taller-rs migrate --rollback 1
  taller-rs seed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read this TOML file instead of the config/ directory layers
    #[arg(short, long, value_name = "FILE", value_parser = validation::config_file)]
    pub config: Option<PathBuf>,

    /// Environment layer to load; defaults to TALLER_APP_ENV, then development
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Interface to bind, e.g. 0.0.0.0 or localhost
        #[arg(long, value_name = "ADDRESS", value_parser = validation::host)]
        host: Option<String>,

        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,

        /// Wins over --verbose, --quiet and the configured level
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Check the settings, print the plan and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply the embedded schema migrations
    Migrate {
        /// List pending migrations only
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert this many of the most recent migrations
        #[arg(long, value_name = "STEPS", value_parser = validation::rollback_steps)]
        rollback: Option<u32>,
    },
    /// Insert whatever reference catalogs, sample employees and admin
    /// account are missing
    Seed,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Combinations clap does not reject on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }
        match &self.command {
            Some(Commands::Migrate {
                dry_run: true,
                rollback: Some(_),
            }) => Err("--dry-run and --rollback are mutually exclusive".to_string()),
            Some(Commands::Serve {
                host: Some(host),
                port: Some(port),
                ..
            }) if host == "0.0.0.0" && *port < 1024 => Err(format!(
                "port {port} on all interfaces needs elevated privileges; pick a port above 1023"
            )),
            _ => Ok(()),
        }
    }
}
