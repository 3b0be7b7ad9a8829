//! Builds [`Settings`] from the TOML layers and `TALLER_*` overrides

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_VAR: &str = "TALLER_CONFIG_DIR";
const CONFIG_FILE_VAR: &str = "TALLER_CONFIG_FILE";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// Where the TOML part of the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `default.toml` (required), then `{environment}.toml` and `local.toml`
    Layers(PathBuf),
    /// One file replacing all three layers
    File(PathBuf),
}

/// Environment variables are applied last, over either source:
/// `TALLER_SERVER__PORT=8080` sets `server.port`.
#[derive(Debug)]
pub struct ConfigLoader {
    source: Source,
    environment: Environment,
}

impl ConfigLoader {
    /// Reads `TALLER_CONFIG_DIR` or `TALLER_CONFIG_FILE` (not both) and
    /// `TALLER_APP_ENV`.
    pub fn new() -> Result<Self, ConfigError> {
        let source = match (
            std::env::var_os(CONFIG_DIR_VAR),
            std::env::var_os(CONFIG_FILE_VAR),
        ) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingSources),
            (None, Some(file)) => Source::File(file.into()),
            (Some(dir), None) => Source::Layers(dir.into()),
            (None, None) => Source::Layers(PathBuf::from("config")),
        };
        Ok(Self::with_source(source, Environment::from_env()))
    }

    pub fn with_source(source: Source, environment: Environment) -> Self {
        Self {
            source,
            environment,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Source::File(path.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// For callers that apply more overrides before validating.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        match &self.source {
            Source::File(path) => builder = toml_layer(builder, path, true)?,
            Source::Layers(dir) => {
                builder = toml_layer(builder, &dir.join("default.toml"), true)?;
                builder = toml_layer(builder, &dir.join(self.environment.layer_file()), false)?;
                builder = toml_layer(builder, &dir.join("local.toml"), false)?;
            }
        }

        builder
            .add_source(
                config::Environment::with_prefix("TALLER")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }
}

fn toml_layer(builder: Builder, path: &Path, required: bool) -> Result<Builder, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let name = path
        .to_str()
        .ok_or_else(|| ConfigError::ParseError(format!("non UTF-8 path {}", path.display())))?;
    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
}

/// Shared helpers for tests that touch process environment variables.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard};

    /// Serializes every test that reads or writes `TALLER_*` variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restores every touched variable on drop.
    pub struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        pub fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        pub fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        pub fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }

        /// Clear every variable that would leak into a config load.
        pub fn clear_taller_vars(&mut self) {
            let keys: Vec<String> = std::env::vars()
                .map(|(key, _)| key)
                .filter(|key| key.starts_with("TALLER_"))
                .collect();
            for key in keys {
                self.remove(&key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }
}
