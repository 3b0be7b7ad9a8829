//! Application state for Axum web framework.

use tokio_util::sync::CancellationToken;

use crate::config::JwtConfig;
use crate::db::AsyncDbPool;

/// Application state shared by every handler.
///
/// Cloning is cheap: the pool and the token are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Pool that every request's unit of work checks a connection out of
    pub db_pool: AsyncDbPool,
    /// JWT configuration for token generation and validation
    pub jwt_config: JwtConfig,
    /// Cancelled when the server starts shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(pool: AsyncDbPool, jwt_config: JwtConfig, shutdown: CancellationToken) -> Self {
        Self {
            db_pool: pool,
            jwt_config,
            shutdown,
        }
    }
}
