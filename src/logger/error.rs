//! Error types for the logger

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid logger setting {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("Subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

impl LoggerError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
