//! Registration and login.

use crate::api::dto::{LoginRequest, RegisterRequest};
use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserType};
use crate::repositories::{FailureKind, UserRepository};
use crate::unit_of_work::UnitOfWork;
use crate::utils::jwt::{IssuedToken, generate_token};
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Issues tokens for new and returning users.
#[derive(Clone)]
pub struct AccountService {
    jwt: JwtConfig,
}

impl AccountService {
    pub fn new(jwt: JwtConfig) -> Self {
        Self { jwt }
    }

    /// Creates a regular user account and signs a token for it.
    ///
    /// # Errors
    /// - `Duplicate` when the email is already registered
    /// - `Rejected` when the store refuses the row (e.g. unknown city)
    pub async fn register(
        &self,
        uow: &UnitOfWork,
        request: RegisterRequest,
    ) -> AppResult<IssuedToken> {
        let email = normalize_email(&request.email);
        let users = uow.repository::<UserRepository>();

        let existing = users.find_by_email(&email).await;
        if existing.was_success() {
            return Err(AppError::Duplicate {
                entity: "user".to_string(),
                field: "email".to_string(),
                value: email,
            });
        }
        if existing.failure_kind() != Some(FailureKind::NotFound) {
            existing.into_app_result()?;
        }

        let new_user = NewUser {
            document: request.document.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            phone_number: non_empty(request.phone_number),
            address: non_empty(request.address),
            city_id: request.city_id,
            user_type: UserType::User,
            password_hash: hash_password(&request.password)?,
        };

        let user = users.add(new_user).await.into_app_result()?;
        uow.save_changes().await?;

        tracing::info!(user_id = user.id, "User registered");
        self.issue(&user)
    }

    /// Checks the credentials and signs a token.
    ///
    /// Unknown emails and wrong passwords fail the same way.
    pub async fn login(&self, uow: &UnitOfWork, request: LoginRequest) -> AppResult<IssuedToken> {
        let found = uow
            .repository::<UserRepository>()
            .find_by_email(&request.email)
            .await;

        let user = match found.into_app_result() {
            Ok(user) => user,
            Err(AppError::Rejected {
                kind: FailureKind::NotFound,
                ..
            }) => return Err(invalid_credentials()),
            Err(e) => return Err(e),
        };

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(invalid_credentials());
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.issue(&user)
    }

    fn issue(&self, user: &User) -> AppResult<IssuedToken> {
        generate_token(
            user.id,
            user.email.clone(),
            user.user_type,
            &self.jwt.secret,
            self.jwt.access_token_expiration,
        )
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized {
        message: INVALID_CREDENTIALS.to_string(),
    }
}

/// Emails are stored trimmed and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
