//! CRUD over any [`Entity`] through the unit of work's session.

use std::marker::PhantomData;

use diesel::QueryResult;

use crate::db::{Access, Session, SharedSession};
use crate::models::Entity;
use crate::repositories::response::{ActionResponse, Operation};
use crate::repositories::Pagination;

/// Generic repository for one entity type.
///
/// Every call returns an [`ActionResponse`]; store errors never escape as
/// `Err`. Writes are held in the session's transaction until the unit of
/// work commits.
pub struct GenericRepository<E: Entity> {
    session: SharedSession,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for GenericRepository<E> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> GenericRepository<E> {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    pub(crate) fn session(&self) -> &SharedSession {
        &self.session
    }

    pub async fn add(&self, new: E::New) -> ActionResponse<E> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Write).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::insert(conn, new).await;
        if let Err(response) = settle(&mut session, &outcome, 1).await {
            return response;
        }

        match outcome {
            Ok(entity) => {
                tracing::debug!(entity = E::NAME, id = entity.id(), "Added record");
                ActionResponse::success(entity)
            }
            Err(e) => rejected(e, Operation::Add),
        }
    }

    pub async fn get(&self, id: i32) -> ActionResponse<E> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::find(conn, id).await;
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(Some(entity)) => ActionResponse::success(entity),
            Ok(None) => ActionResponse::not_found(),
            Err(e) => rejected(e, Operation::Read),
        }
    }

    /// Every row in the entity's default order.
    pub async fn get_all(&self) -> ActionResponse<Vec<E>> {
        self.list(None, None).await
    }

    /// One page in the entity's default order, filtered by the pagination's
    /// filter text.
    pub async fn get_page(&self, pagination: &Pagination) -> ActionResponse<Vec<E>> {
        self.list(pagination.filter(), Some(pagination.window())).await
    }

    /// Rows matching the pagination's filter text; every row when it has none.
    pub async fn count(&self, pagination: &Pagination) -> ActionResponse<i64> {
        self.count_matching(pagination.filter()).await
    }

    /// Replaces every writable column of the row with `id`.
    pub async fn update(&self, id: i32, changes: E::Changes) -> ActionResponse<E> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Write).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::update(conn, id, changes).await;
        let rows = match &outcome {
            Ok(Some(_)) => 1,
            _ => 0,
        };
        if let Err(response) = settle(&mut session, &outcome, rows).await {
            return response;
        }

        match outcome {
            Ok(Some(entity)) => {
                tracing::debug!(entity = E::NAME, id, "Updated record");
                ActionResponse::success(entity)
            }
            Ok(None) => ActionResponse::not_found(),
            Err(e) => rejected(e, Operation::Update),
        }
    }

    pub async fn delete(&self, id: i32) -> ActionResponse<()> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Write).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::delete(conn, id).await;
        let rows = outcome.as_ref().copied().unwrap_or(0);
        if let Err(response) = settle(&mut session, &outcome, rows).await {
            return response;
        }

        match outcome {
            Ok(0) => ActionResponse::not_found(),
            Ok(_) => {
                tracing::debug!(entity = E::NAME, id, "Deleted record");
                ActionResponse::success(())
            }
            Err(e) => rejected(e, Operation::Delete),
        }
    }

    pub(crate) async fn list(
        &self,
        filter: Option<&str>,
        window: Option<(i64, i64)>,
    ) -> ActionResponse<Vec<E>> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::list(conn, filter, window).await;
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(rows) => ActionResponse::success(rows),
            Err(e) => rejected(e, Operation::Read),
        }
    }

    pub(crate) async fn count_matching(&self, filter: Option<&str>) -> ActionResponse<i64> {
        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = E::count(conn, filter).await;
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(total) => ActionResponse::success(total),
            Err(e) => rejected(e, Operation::Read),
        }
    }
}

/// Closes the session operation opened for `outcome`.
pub(crate) async fn settle<T, U>(
    session: &mut Session,
    outcome: &QueryResult<T>,
    rows: usize,
) -> Result<(), ActionResponse<U>> {
    session
        .end(outcome.is_ok(), rows)
        .await
        .map_err(|e| ActionResponse::from_app_error(&e))
}

pub(crate) fn rejected<T>(error: diesel::result::Error, operation: Operation) -> ActionResponse<T> {
    let response = ActionResponse::from_diesel(error, operation);
    tracing::warn!(
        operation = operation.as_str(),
        failure = ?response.failure_kind(),
        message = response.message().unwrap_or_default(),
        "Store rejected operation"
    );
    response
}
