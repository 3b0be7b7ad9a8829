//! Account DTOs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::jwt::IssuedToken;

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com", format = "email")]
    pub email: String,
    #[validate(length(min = 6, max = 30, message = "Password must be between 6 and 30 characters"))]
    #[schema(example = "password123", format = "password", min_length = 6, max_length = 30)]
    pub password: String,
}

/// Register request payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Identity document number
    #[validate(length(min = 1, max = 20, message = "Document must be between 1 and 20 characters"))]
    #[schema(example = "1010", max_length = 20)]
    pub document: String,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    #[schema(example = "Ana", max_length = 50)]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    #[schema(example = "Gómez", max_length = 50)]
    pub last_name: String,
    /// Email address (unique)
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com", format = "email")]
    pub email: String,
    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    #[schema(example = "322 311 4620")]
    pub phone_number: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    #[schema(example = "Calle Luna Calle Sol")]
    pub address: Option<String>,
    #[validate(range(min = 1, message = "City must be a valid id"))]
    pub city_id: Option<i32>,
    /// Plain text password, stored hashed
    #[validate(length(min = 6, max = 30, message = "Password must be between 6 and 30 characters"))]
    #[schema(example = "password123", format = "password", min_length = 6, max_length = 30)]
    pub password: String,
}

/// Access token and the moment it expires.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
    #[schema(value_type = String, format = DateTime, example = "2024-01-02T12:00:00Z")]
    pub expiration: Timestamp,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expiration: issued.expiration,
        }
    }
}
