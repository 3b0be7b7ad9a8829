//! Dropdown lists for the catalog tables.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{Access, SharedSession};
use crate::models::{Category, City, Country, State};
use crate::repositories::generic::{rejected, settle};
use crate::repositories::response::{ActionResponse, Operation};
use crate::repositories::GenericRepository;
use crate::unit_of_work::FromSession;

/// Name-ordered lists used to fill selection boxes, including the
/// country → state → city cascade.
#[derive(Clone)]
pub struct CatalogRepository {
    session: SharedSession,
}

impl CatalogRepository {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    pub async fn categories_combo(&self) -> ActionResponse<Vec<Category>> {
        GenericRepository::<Category>::new(self.session.clone())
            .get_all()
            .await
    }

    pub async fn countries_combo(&self) -> ActionResponse<Vec<Country>> {
        GenericRepository::<Country>::new(self.session.clone())
            .get_all()
            .await
    }

    /// States of `country_id`; empty when the country has none or does not
    /// exist.
    pub async fn states_combo(&self, country_id: i32) -> ActionResponse<Vec<State>> {
        use crate::schema::states;

        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = states::table
            .filter(states::country_id.eq(country_id))
            .order_by((states::name.asc(), states::id.asc()))
            .select(State::as_select())
            .load(conn)
            .await;
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(rows) => ActionResponse::success(rows),
            Err(e) => rejected(e, Operation::Read),
        }
    }

    /// Cities of `state_id`; empty when the state has none or does not exist.
    pub async fn cities_combo(&self, state_id: i32) -> ActionResponse<Vec<City>> {
        use crate::schema::cities;

        let mut session = self.session.lock().await;
        let conn = match session.begin(Access::Read).await {
            Ok(conn) => conn,
            Err(e) => return ActionResponse::from_app_error(&e),
        };
        let outcome = cities::table
            .filter(cities::state_id.eq(state_id))
            .order_by((cities::name.asc(), cities::id.asc()))
            .select(City::as_select())
            .load(conn)
            .await;
        if let Err(response) = settle(&mut session, &outcome, 0).await {
            return response;
        }

        match outcome {
            Ok(rows) => ActionResponse::success(rows),
            Err(e) => rejected(e, Operation::Read),
        }
    }
}

impl FromSession for CatalogRepository {
    fn from_session(session: SharedSession) -> Self {
        Self::new(session)
    }
}
