//! Request-scoped unit of work.
//!
//! A [`UnitOfWork`] owns one [`Session`] and hands out repositories bound to
//! it. Writes made through any of those repositories become durable only
//! when [`UnitOfWork::commit`] succeeds.

use std::any::{Any, TypeId};
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::db::{AsyncDbPool, Session, SharedSession};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Builds a repository bound to a session.
pub trait FromSession: Send + Sync + 'static {
    fn from_session(session: SharedSession) -> Self;
}

type Registry = DashMap<TypeId, Arc<dyn Any + Send + Sync>>;

pub struct UnitOfWork {
    session: SharedSession,
    repositories: Registry,
    cancel: CancellationToken,
}

impl UnitOfWork {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self::with_cancellation(pool, CancellationToken::new())
    }

    /// A unit of work whose [`UnitOfWork::save_changes`] is refused once
    /// `cancel` fires.
    pub fn with_cancellation(pool: AsyncDbPool, cancel: CancellationToken) -> Self {
        Self {
            session: Session::new(pool).into_shared(),
            repositories: DashMap::new(),
            cancel,
        }
    }

    /// The repository of type `R` for this scope, created on first use.
    ///
    /// Repeated calls return the same instance.
    pub fn repository<R: FromSession>(&self) -> Arc<R> {
        let entry = self
            .repositories
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                tracing::trace!(repository = std::any::type_name::<R>(), "Creating repository");
                Arc::new(R::from_session(self.session.clone())) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        match entry.downcast::<R>() {
            Ok(repository) => repository,
            // Entries are keyed by their own TypeId
            Err(_) => Arc::new(R::from_session(self.session.clone())),
        }
    }

    /// Commits every pending write of this scope in one transaction.
    ///
    /// Returns the number of affected rows. A cancelled `cancel` rolls the
    /// writes back and fails with [`AppError::Cancelled`].
    pub async fn commit(&self, cancel: &CancellationToken) -> AppResult<usize> {
        self.session.lock().await.commit(cancel).await
    }

    /// [`UnitOfWork::commit`] with the scope's own cancellation token.
    pub async fn save_changes(&self) -> AppResult<usize> {
        self.commit(&self.cancel).await
    }

    /// Releases the connection, discarding uncommitted writes.
    ///
    /// Only the first call has an effect.
    pub async fn dispose(&self) {
        self.session.lock().await.dispose().await;
        self.repositories.clear();
    }
}

impl FromRequestParts<AppState> for UnitOfWork {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        Ok(UnitOfWork::with_cancellation(
            state.db_pool.clone(),
            state.shutdown.child_token(),
        ))
    }
}
