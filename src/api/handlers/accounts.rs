//! Account handlers: registration and login.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ACCOUNT_TAG;
use crate::api::dto::{ErrorResponse, LoginRequest, RegisterRequest, TokenResponse};
use crate::error::AppResult;
use crate::services::AccountService;
use crate::state::AppState;
use crate::unit_of_work::UnitOfWork;
use crate::utils::validate::ValidatedJson;

/// Creates the account routes
///
/// # Routes
/// - `POST /register` - Create an account and get a token
/// - `POST /login` - Exchange credentials for a token
pub fn account_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
}

/// POST /api/accounts/register
#[utoipa::path(
    post,
    path = "/register",
    tag = ACCOUNT_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid data or email already registered", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    uow: UnitOfWork,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let issued = AccountService::new(state.jwt_config.clone())
        .register(&uow, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// POST /api/accounts/login
#[utoipa::path(
    post,
    path = "/login",
    tag = ACCOUNT_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    uow: UnitOfWork,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let issued = AccountService::new(state.jwt_config.clone())
        .login(&uow, payload)
        .await?;
    Ok(Json(issued.into()))
}
