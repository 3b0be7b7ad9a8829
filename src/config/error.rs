//! Errors raised while locating, reading or checking the settings.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required layer is missing
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The layers merged but do not fit [`Settings`](super::Settings)
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A setting holds a value the service cannot run with
    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Unknown environment '{0}', expected one of development, test, production")]
    UnknownEnvironment(String),

    /// `TALLER_CONFIG_DIR` and `TALLER_CONFIG_FILE` are both set
    #[error("TALLER_CONFIG_DIR and TALLER_CONFIG_FILE cannot both be set")]
    ConflictingSources,

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
