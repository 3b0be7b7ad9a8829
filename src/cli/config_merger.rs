//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments override configuration file values; the merged settings are
//! validated once, after every override is applied.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the way the CLI selects it.
    ///
    /// `--config` replaces the layered directory with one file and `--env`
    /// picks the environment layer; `TALLER_*` variables apply either way.
    ///
    /// # Errors
    /// Returns ConfigError if the files cannot be found or parsed
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = &cli.config {
            loader = loader.with_file(path);
        }
        if let Some(env) = &cli.env {
            loader = loader.with_environment(*env);
        }

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Merge CLI arguments with the base configuration and validate the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Command level takes precedence over --verbose/--quiet
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::test_support::{EnvGuard, lock_env};
    use clap::Parser;
    use std::io::Write;

    fn create_valid_base_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/test".to_string();
        config
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(create_valid_base_config())
            .merge_cli_args(&cli)
            .unwrap()
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["taller-rs", "--verbose"]).logger.level, "debug");
        assert_eq!(merge(&["taller-rs", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let merged = merge(&["taller-rs", "serve", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged = merge(&["taller-rs", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_seed_leaves_server_untouched() {
        let merged = merge(&["taller-rs", "seed"]);
        assert_eq!(merged.server, create_valid_base_config().server);
    }

    #[test]
    fn test_invalid_merge_is_rejected() {
        let mut base = create_valid_base_config();
        base.database.url = "mysql://localhost/test".to_string();
        let cli = Cli::try_parse_from(["taller-rs"]).unwrap();

        assert!(ConfigurationMerger::new(base).merge_cli_args(&cli).is_err());
    }

    #[test]
    fn test_from_cli_reads_config_file() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_taller_vars();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9191\n\n[database]\nurl = \"postgres://localhost/taller\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["taller-rs", "--config", path.as_str()]).unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.config().server.port, 9191);
        assert_eq!(merger.config().database.url, "postgres://localhost/taller");
    }
}
