//! Client-side error classification.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::dto::ErrorResponse;

/// Failure of a call made through [`super::ApiClient`].
///
/// `Display` renders the message meant for the person using the client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        body: String,
        message: String,
    },

    /// No response arrived; `status` is the closest HTTP equivalent.
    #[error("{message}")]
    Transport { status: StatusCode, message: String },

    /// The response arrived but its body did not have the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// Classifies a failed response. A JSON [`ErrorResponse`] body
    /// contributes its `message`; any other body is used as is.
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error_message(status, &error.message),
            Err(_) => error_message(status, &body),
        };
        Self::Status {
            status,
            body,
            message,
        }
    }

    /// Maps a request that failed before any response to a status.
    ///
    /// Timeouts become 408, connection failures 503, anything else 500.
    pub fn from_transport(error: &reqwest::Error) -> Self {
        let status = if error.is_timeout() {
            StatusCode::REQUEST_TIMEOUT
        } else if error.is_connect() || error.is_request() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        Self::Transport {
            status,
            message: error_message(status, &error.to_string()),
        }
    }

    /// HTTP status of the failure, when it has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::Transport { status, .. } => Some(*status),
            Self::Decode(_) | Self::Setup(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Human readable message for a failed response.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    match status {
        StatusCode::NOT_FOUND => "Resource not found.".to_string(),
        StatusCode::BAD_REQUEST if body.is_empty() => "Invalid request.".to_string(),
        StatusCode::BAD_REQUEST => body.to_string(),
        StatusCode::UNAUTHORIZED => "You must be logged in to perform this operation.".to_string(),
        StatusCode::FORBIDDEN => "You do not have permission to perform this operation.".to_string(),
        StatusCode::REQUEST_TIMEOUT => "Request timed out.".to_string(),
        StatusCode::SERVICE_UNAVAILABLE => format!("Service unavailable: {}", body),
        other => {
            let reason = other.canonical_reason().unwrap_or("Unknown");
            if body.is_empty() {
                format!("Error {} {}.", other.as_u16(), reason)
            } else {
                format!("Error {} {}. {}", other.as_u16(), reason, body)
            }
        }
    }
}
