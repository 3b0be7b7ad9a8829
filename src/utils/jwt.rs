use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::UserType;

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Role of the user
    pub user_type: UserType,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued at `now` and valid for `expiration_hours`.
    pub fn new(
        user_id: i32,
        email: String,
        user_type: UserType,
        now: Timestamp,
        expiration_hours: i64,
    ) -> Self {
        let exp = now.as_second() + SignedDuration::from_hours(expiration_hours).as_secs();
        Self {
            sub: user_id.to_string(),
            email,
            user_type,
            iat: now.as_second(),
            exp,
        }
    }

    /// The user id in `sub`.
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::Unauthorized {
            message: "Invalid user ID in token".to_string(),
        })
    }

    pub fn expires_at(&self) -> AppResult<Timestamp> {
        Timestamp::from_second(self.exp).map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Token expiration out of range: {}", e),
        })
    }
}

/// A signed token and the moment it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: Timestamp,
}

/// Signs an access token for a user.
///
/// # Example
/// ```ignore
/// let issued = generate_token(1, "user@example.com".to_string(), UserType::User, "secret", 24)?;
/// ```
pub fn generate_token(
    user_id: i32,
    email: String,
    user_type: UserType,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<IssuedToken> {
    let claims = Claims::new(user_id, email, user_type, Timestamp::now(), expiration_hours);
    let expiration = claims.expires_at()?;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })?;

    Ok(IssuedToken { token, expiration })
}

/// Validates and decodes a token.
///
/// The expiration is enforced without leeway.
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidToken => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: format!("Token validation failed: {}", e),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    #[test]
    fn test_generate_and_validate_token() {
        let issued = generate_token(
            7,
            "test@example.com".to_string(),
            UserType::Admin,
            TEST_SECRET,
            24,
        )
        .unwrap();
        assert!(issued.token.contains('.'));

        let claims = validate_token(&issued.token, TEST_SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.user_type, UserType::Admin);
        assert_eq!(claims.expires_at().unwrap(), issued.expiration);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = generate_token(
            1,
            "test@example.com".to_string(),
            UserType::User,
            TEST_SECRET,
            1,
        )
        .unwrap();

        match validate_token(&issued.token, "another_secret_key_for_jwt_testing_0123") {
            Err(AppError::Unauthorized { message }) => {
                assert_eq!(message, "Invalid token signature")
            }
            other => panic!("Expected Unauthorized error, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued_at = Timestamp::now() - SignedDuration::from_hours(3);
        let claims = Claims::new(1, "old@example.com".to_string(), UserType::User, issued_at, 1);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        match validate_token(&token, TEST_SECRET) {
            Err(AppError::Unauthorized { message }) => assert_eq!(message, "Token has expired"),
            other => panic!("Expected expired token error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            validate_token("not-a-token", TEST_SECRET),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_invalid_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            email: "x@example.com".to_string(),
            user_type: UserType::User,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.user_id(), Err(AppError::Unauthorized { .. })));
    }
}
