//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaves the API as an [`ErrorResponse`] body. Handlers build
//! it through `IntoResponse for AppError`; `global_error_handler` stamps the
//! request id on it and rewrites the plain-text errors axum produces on its
//! own (unknown route, wrong method) into the same shape.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::{ErrorResponse, FieldError};
use crate::api::middleware::RequestId;
use crate::error::AppError;
use crate::repositories::FailureKind;

/// Status code and error code for a repository failure.
pub fn failure_status(kind: FailureKind) -> (StatusCode, &'static str) {
    match kind {
        FailureKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        FailureKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        FailureKind::Constraint => (StatusCode::BAD_REQUEST, "CONSTRAINT_VIOLATION"),
        FailureKind::Transient => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        FailureKind::Unknown => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Rejected { kind, message } => {
                let (status, code) = failure_status(*kind);
                (status, ErrorResponse::new(code, message))
            }
            AppError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", &self.to_string()),
            ),
            AppError::Duplicate { .. } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("CONSTRAINT_VIOLATION", &self.to_string()),
            ),
            AppError::Validation { .. } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", &self.to_string()),
            ),
            AppError::ValidationErrors { errors } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", &self.to_string())
                    .with_errors(errors.iter().map(FieldError::from).collect()),
            ),
            AppError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message),
            ),
            AppError::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("UNAUTHORIZED", message),
            ),
            AppError::Unavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("SERVICE_UNAVAILABLE", message),
            ),
            AppError::ConnectionPool { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable"),
            ),
            AppError::Cancelled { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("SERVICE_UNAVAILABLE", &self.to_string()),
            ),
            AppError::Database { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("DATABASE_ERROR", &self.to_string()),
            ),
            AppError::Configuration { key, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("CONFIGURATION_ERROR", &format!("Configuration error: {}", key)),
            ),
            AppError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response = (status, Json(error_response.clone())).into_response();
        response.extensions_mut().insert(error_response);
        response
    }
}

/// Fills in `request_id` on error bodies and gives bodiless or plain-text
/// error responses the standard JSON shape.
///
/// Must run inside `request_id_middleware`.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let body = match response.extensions().get::<ErrorResponse>() {
        Some(body) => body.clone(),
        None if is_json(&response) => return response,
        None => {
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(body, 64 * 1024)
                .await
                .unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let mut rebuilt = (status, Json(fallback_body(status, text))).into_response();
            for (name, value) in parts.headers.iter() {
                if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
                    rebuilt.headers_mut().insert(name.clone(), value.clone());
                }
            }
            return stamp(rebuilt, request_id);
        }
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let rebuilt = Response::from_parts(parts, Json(body).into_response().into_body());
    stamp(rebuilt, request_id)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn fallback_body(status: StatusCode, text: String) -> ErrorResponse {
    let code = match status {
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "BAD_REQUEST",
    };
    let message = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        text
    };
    ErrorResponse::new(code, &message)
}

/// Re-serializes the error body with the request id.
fn stamp(response: Response, request_id: Option<String>) -> Response {
    let Some(request_id) = request_id else {
        return response;
    };
    let Some(body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = body.with_request_id(&request_id);
    parts.extensions.insert(body.clone());
    Response::from_parts(parts, Json(body).into_response().into_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_failure_kind_status_mapping() {
        assert_eq!(failure_status(FailureKind::NotFound).0, StatusCode::NOT_FOUND);
        assert_eq!(failure_status(FailureKind::Validation).0, StatusCode::BAD_REQUEST);
        assert_eq!(failure_status(FailureKind::Constraint).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            failure_status(FailureKind::Transient).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            failure_status(FailureKind::Unknown).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_rejected_message_is_returned_verbatim() {
        let response = AppError::Rejected {
            kind: FailureKind::Constraint,
            message: "Record already exists.".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.code, "CONSTRAINT_VIOLATION");
        assert_eq!(body.message, "Record already exists.");
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let response = AppError::ValidationErrors {
            errors: vec![crate::error::ValidationFieldError {
                field: "first_name".to_string(),
                message: "First name is required".to_string(),
            }],
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.errors[0].field, "first_name");
    }

    #[test]
    fn test_infrastructure_status_codes() {
        let cases = [
            (
                AppError::Unauthorized {
                    message: "Missing authorization header".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Cancelled {
                    operation: "commit".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Internal {
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_stamp_adds_request_id() {
        let response = AppError::BadRequest {
            message: "bad".to_string(),
        }
        .into_response();

        let body = body_of(stamp(response, Some("req-1".to_string()))).await;
        assert_eq!(body.request_id.as_deref(), Some("req-1"));
        assert_eq!(body.message, "bad");
    }

    #[test]
    fn test_fallback_body_for_unknown_route() {
        let body = fallback_body(StatusCode::NOT_FOUND, String::new());
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.message, "Not Found");

        let body = fallback_body(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected JSON".to_string());
        assert_eq!(body.message, "Expected JSON");
    }

    #[tokio::test]
    async fn test_plain_response_untouched_without_error() {
        let response = Response::new(Body::from("ok"));
        assert_eq!(stamp(response, Some("x".into())).status(), StatusCode::OK);
    }
}
