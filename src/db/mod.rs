//! Database access: connection pool, embedded migrations and the
//! per-request session that owns one pooled connection.

pub mod migrate;
mod pool;
mod session;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use pool::{AsyncDbPool, establish_async_connection_pool};
pub use session::{Access, Session, SharedSession};

#[cfg(test)]
pub(crate) use pool::lazy_pool;

/// Migrations compiled into the binary from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
