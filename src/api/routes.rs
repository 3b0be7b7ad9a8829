//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    REQUEST_ID_HEADER, auth_middleware, global_error_handler, logging_middleware,
    request_id_middleware,
};
use crate::config::CorsConfig;
use crate::state::AppState;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - opens the request span
/// 3. CORS, when origins are configured
/// 4. Response compression
/// 5. Error handler - gives every error the JSON error body
///
/// # Routes
/// - `/api/employees` - Employee CRUD, search and paging (bearer token)
/// - `/api/categories`, `/api/countries`, `/api/states`, `/api/cities`
/// - `/api/accounts` - Registration and login
/// - `/health` - Health probes
/// - `/swagger-ui`, `/api-docs/openapi.json` - API documentation
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let employees = handlers::employees::employee_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let (documented, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/employees", employees)
        .nest("/api/accounts", handlers::accounts::account_routes())
        .nest("/api", handlers::catalog::catalog_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    let mut router = documented
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, openapi))
        .layer(middleware::from_fn(global_error_handler))
        .layer(CompressionLayer::new());

    if let Some(cors) = cors_layer(cors) {
        router = router.layer(cors);
    }

    router
        // Logging runs after request_id has set the ID
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// CORS policy from configuration; `None` when no origin is allowed.
pub fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([header::LOCATION, request_id])
        .max_age(Duration::from_secs(config.max_age));

    if config.allows_any_origin() {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        layer
            .allow_origin(origins)
            .allow_credentials(config.allow_credentials),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::ErrorResponse;
    use crate::config::JwtConfig;
    use crate::db::lazy_pool;
    use tokio_util::sync::CancellationToken;

    /// Serves the router on an ephemeral port backed by an unreachable store.
    async fn spawn_app() -> String {
        let state = AppState::new(
            lazy_pool("postgres://localhost:1/unreachable"),
            JwtConfig {
                secret: "test_secret_key_at_least_32_characters_long".to_string(),
                access_token_expiration: 1,
            },
            CancellationToken::new(),
        );
        let router = create_router(state, &cors(&["*"]));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", address)
    }

    fn cors(origins: &[&str]) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..CorsConfig::default()
        }
    }

    #[test]
    fn test_cors_disabled_without_origins() {
        assert!(cors_layer(&cors(&[])).is_none());
    }

    #[test]
    fn test_cors_enabled_with_origins() {
        assert!(cors_layer(&cors(&["*"])).is_some());
        assert!(cors_layer(&cors(&["http://localhost:5173"])).is_some());
    }

    #[test]
    fn test_openapi_document_lists_tags() {
        let doc = ApiDoc::openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(tags.contains(&"Employees".to_string()));
        assert!(tags.contains(&"Accounts".to_string()));
        assert!(tags.contains(&"Catalogs".to_string()));
    }

    #[tokio::test]
    async fn test_employees_require_token() {
        let base = spawn_app().await;
        let response = reqwest::get(format!("{}/api/employees", base)).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.code, "UNAUTHORIZED");
        assert!(body.request_id.is_some());
    }

    #[tokio::test]
    async fn test_unknown_route_gets_json_error() {
        let base = spawn_app().await;
        let response = reqwest::get(format!("{}/no/such/route", base)).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_store_outage_is_service_unavailable() {
        let base = spawn_app().await;
        let response = reqwest::get(format!("{}/api/countries/combo", base))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.code, "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_liveness_and_openapi_are_served() {
        let base = spawn_app().await;

        let live = reqwest::get(format!("{}/health/live", base)).await.unwrap();
        assert_eq!(live.status(), reqwest::StatusCode::OK);

        let doc = reqwest::get(format!("{}{}", base, OPENAPI_JSON_PATH))
            .await
            .unwrap();
        assert_eq!(doc.status(), reqwest::StatusCode::OK);
        let doc: serde_json::Value = doc.json().await.unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/employees/paginated"));
        assert!(paths.contains_key("/api/categories"));
        assert!(paths.contains_key("/api/cities/combo/{state_id}"));
    }
}
