use std::ops::Deref;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{Access, SharedSession};
use crate::models::User;
use crate::repositories::generic::{rejected, settle};
use crate::repositories::response::{ActionResponse, Operation};
use crate::repositories::GenericRepository;
use crate::unit_of_work::FromSession;

/// User accounts: generic CRUD plus lookup by login email.
#[derive(Clone)]
pub struct UserRepository {
    inner: GenericRepository<User>,
}

impl UserRepository {
    pub fn new(session: SharedSession) -> Self {
        Self {
            inner: GenericRepository::new(session),
        }
    }

    /// Finds the user registered with `email`. Emails are stored lowercase,
    /// so the lookup ignores case.
    ///
    /// A missing account is a `NotFound` failure.
    pub async fn find_by_email(&self, email: &str) -> ActionResponse<User> {
        use crate::schema::users;

        let email = email.trim().to_lowercase();
        let mut session = self.inner.session().lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = users::table
            .filter(users::email.eq(&email))
            .select(User::as_select())
            .first(conn)
            .await
            .optional();
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(Some(user)) => ActionResponse::success(user),
            Ok(None) => ActionResponse::not_found(),
            Err(e) => rejected(e, Operation::Read),
        }
    }
}

impl Deref for UserRepository {
    type Target = GenericRepository<User>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromSession for UserRepository {
    fn from_session(session: SharedSession) -> Self {
        Self::new(session)
    }
}
