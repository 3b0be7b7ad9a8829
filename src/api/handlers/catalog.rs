//! Lookup catalog endpoints.
//!
//! Categories, countries, states and cities share one set of generic
//! handlers parameterized by [`CatalogResource`]. Reads are public since the
//! registration form fills its selection boxes from them; writes need a
//! bearer token.

use axum::{
    Json,
    extract::{Path, Query},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use crate::api::doc::CATALOG_TAG;
use crate::api::dto::{
    CategoryRequest, CityRequest, CountryRequest, ErrorResponse, FilterQuery, StateRequest,
};
use crate::api::handlers::employees::ensure_same_id;
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::{Category, City, Country, Entity, State};
use crate::repositories::{CatalogRepository, GenericRepository, Pagination, PaginationQuery};
use crate::state::AppState;
use crate::unit_of_work::UnitOfWork;
use crate::utils::validate::ValidatedJson;

/// A catalog entity exposed over HTTP.
pub trait CatalogResource: Entity + Serialize + Clone {
    /// Request body for create and replace.
    type Request: DeserializeOwned + Validate + Send + 'static;

    /// Collection path under `/api`.
    const PATH: &'static str;

    fn request_id(request: &Self::Request) -> Option<i32>;

    fn into_new(request: Self::Request) -> Self::New;

    fn into_changes(request: Self::Request) -> Self::Changes;
}

macro_rules! catalog_resource {
    ($model:ty, $request:ty, $path:literal) => {
        impl CatalogResource for $model {
            type Request = $request;

            const PATH: &'static str = $path;

            fn request_id(request: &Self::Request) -> Option<i32> {
                request.id
            }

            fn into_new(request: Self::Request) -> Self::New {
                request.into()
            }

            fn into_changes(request: Self::Request) -> Self::Changes {
                request.into()
            }
        }
    };
}

catalog_resource!(Category, CategoryRequest, "categories");
catalog_resource!(Country, CountryRequest, "countries");
catalog_resource!(State, StateRequest, "states");
catalog_resource!(City, CityRequest, "cities");

/// Documented routes for one catalog, generated over the generic handlers
/// below. Reads are public, writes carry `bearerAuth`.
macro_rules! documented_catalog {
    (
        $router:ident for $model:ident, $request:ident {
            $list:ident, $fetch:ident, $create:ident, $update:ident,
            $remove:ident, $total:ident, $page:ident $(,)?
        }
    ) => {
        fn $router() -> OpenApiRouter<AppState> {
            OpenApiRouter::new()
                .routes(routes!($list, $create))
                .routes(routes!($fetch, $update, $remove))
                .routes(routes!($total))
                .routes(routes!($page))
        }

        #[utoipa::path(
            get,
            path = "/",
            tag = CATALOG_TAG,
            responses((status = 200, description = "Every record", body = Vec<$model>))
        )]
        async fn $list(uow: UnitOfWork) -> AppResult<Json<Vec<$model>>> {
            list::<$model>(uow).await
        }

        #[utoipa::path(
            get,
            path = "/{id}",
            tag = CATALOG_TAG,
            params(("id" = i32, Path, description = "Record id")),
            responses(
                (status = 200, description = "The record", body = $model),
                (status = 404, description = "No record has this id", body = ErrorResponse)
            )
        )]
        async fn $fetch(uow: UnitOfWork, id: Path<i32>) -> AppResult<Json<$model>> {
            fetch::<$model>(uow, id).await
        }

        #[utoipa::path(
            post,
            path = "/",
            tag = CATALOG_TAG,
            request_body = $request,
            responses(
                (status = 201, description = "Record created", body = $model),
                (status = 400, description = "Invalid or duplicate", body = ErrorResponse),
                (status = 401, description = "Missing or invalid token", body = ErrorResponse)
            ),
            security(("bearerAuth" = []))
        )]
        async fn $create(
            user: AuthUser,
            uow: UnitOfWork,
            payload: ValidatedJson<$request>,
        ) -> AppResult<(StatusCode, HeaderMap, Json<$model>)> {
            create::<$model>(user, uow, payload).await
        }

        #[utoipa::path(
            put,
            path = "/{id}",
            tag = CATALOG_TAG,
            params(("id" = i32, Path, description = "Record id")),
            request_body = $request,
            responses(
                (status = 200, description = "Record replaced", body = $model),
                (status = 400, description = "Id mismatch or invalid data", body = ErrorResponse),
                (status = 404, description = "No record has this id", body = ErrorResponse)
            ),
            security(("bearerAuth" = []))
        )]
        async fn $update(
            user: AuthUser,
            uow: UnitOfWork,
            id: Path<i32>,
            payload: ValidatedJson<$request>,
        ) -> AppResult<Json<$model>> {
            update::<$model>(user, uow, id, payload).await
        }

        #[utoipa::path(
            delete,
            path = "/{id}",
            tag = CATALOG_TAG,
            params(("id" = i32, Path, description = "Record id")),
            responses(
                (status = 204, description = "Record deleted"),
                (status = 400, description = "Still referenced", body = ErrorResponse),
                (status = 404, description = "No record has this id", body = ErrorResponse)
            ),
            security(("bearerAuth" = []))
        )]
        async fn $remove(user: AuthUser, uow: UnitOfWork, id: Path<i32>) -> AppResult<StatusCode> {
            remove::<$model>(user, uow, id).await
        }

        #[utoipa::path(
            get,
            path = "/totalRecords",
            tag = CATALOG_TAG,
            params(FilterQuery),
            responses((status = 200, description = "Number of matching records", body = i64))
        )]
        async fn $total(uow: UnitOfWork, query: Query<FilterQuery>) -> AppResult<Json<i64>> {
            total_records::<$model>(uow, query).await
        }

        #[utoipa::path(
            get,
            path = "/paginated",
            tag = CATALOG_TAG,
            params(PaginationQuery),
            responses((status = 200, description = "One page of records", body = Vec<$model>))
        )]
        async fn $page(
            uow: UnitOfWork,
            query: Query<PaginationQuery>,
        ) -> AppResult<Json<Vec<$model>>> {
            paginated::<$model>(uow, query).await
        }
    };
}

documented_catalog!(category_routes for Category, CategoryRequest {
    list_categories, get_category, create_category, update_category,
    delete_category, count_categories, page_categories,
});
documented_catalog!(country_routes for Country, CountryRequest {
    list_countries, get_country, create_country, update_country,
    delete_country, count_countries, page_countries,
});
documented_catalog!(state_routes for State, StateRequest {
    list_states, get_state, create_state, update_state,
    delete_state, count_states, page_states,
});
documented_catalog!(city_routes for City, CityRequest {
    list_cities, get_city, create_city, update_city,
    delete_city, count_cities, page_cities,
});

/// Routes for every catalog, each nested under its own path.
///
/// Besides the CRUD and paging routes, each catalog has a `combo` listing
/// for selection boxes: `/combo` for categories and countries,
/// `/combo/{parent_id}` for the states of a country and the cities of a
/// state.
pub fn catalog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest(
            "/categories",
            category_routes().routes(routes!(categories_combo)),
        )
        .nest("/countries", country_routes().routes(routes!(countries_combo)))
        .nest("/states", state_routes().routes(routes!(states_combo)))
        .nest("/cities", city_routes().routes(routes!(cities_combo)))
}

async fn list<C: CatalogResource>(uow: UnitOfWork) -> AppResult<Json<Vec<C>>> {
    let rows = uow
        .repository::<GenericRepository<C>>()
        .get_all()
        .await
        .into_app_result()?;
    Ok(Json(rows))
}

async fn fetch<C: CatalogResource>(uow: UnitOfWork, Path(id): Path<i32>) -> AppResult<Json<C>> {
    let row = uow
        .repository::<GenericRepository<C>>()
        .get(id)
        .await
        .into_app_result()?;
    Ok(Json(row))
}

async fn create<C: CatalogResource>(
    user: AuthUser,
    uow: UnitOfWork,
    ValidatedJson(payload): ValidatedJson<C::Request>,
) -> AppResult<(StatusCode, HeaderMap, Json<C>)> {
    let row = uow
        .repository::<GenericRepository<C>>()
        .add(C::into_new(payload))
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    tracing::info!(
        entity = C::NAME,
        id = row.id(),
        user_id = user.user_id,
        "Catalog record created"
    );

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/{}/{}", C::PATH, row.id())) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(row)))
}

async fn update<C: CatalogResource>(
    _user: AuthUser,
    uow: UnitOfWork,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<C::Request>,
) -> AppResult<Json<C>> {
    ensure_same_id(id, C::request_id(&payload))?;

    let row = uow
        .repository::<GenericRepository<C>>()
        .update(id, C::into_changes(payload))
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    Ok(Json(row))
}

async fn remove<C: CatalogResource>(
    user: AuthUser,
    uow: UnitOfWork,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    uow.repository::<GenericRepository<C>>()
        .delete(id)
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    tracing::info!(entity = C::NAME, id, user_id = user.user_id, "Catalog record deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn total_records<C: CatalogResource>(
    uow: UnitOfWork,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<i64>> {
    let pagination = Pagination::new(1, 1, query.filter);
    let total = uow
        .repository::<GenericRepository<C>>()
        .count(&pagination)
        .await
        .into_app_result()?;
    Ok(Json(total))
}

async fn paginated<C: CatalogResource>(
    uow: UnitOfWork,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<Vec<C>>> {
    let rows = uow
        .repository::<GenericRepository<C>>()
        .get_page(&Pagination::from(query))
        .await
        .into_app_result()?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/combo",
    tag = CATALOG_TAG,
    responses((status = 200, description = "Categories ordered by name", body = Vec<Category>))
)]
async fn categories_combo(uow: UnitOfWork) -> AppResult<Json<Vec<Category>>> {
    let rows = uow
        .repository::<CatalogRepository>()
        .categories_combo()
        .await
        .into_app_result()?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/combo",
    tag = CATALOG_TAG,
    responses((status = 200, description = "Countries ordered by name", body = Vec<Country>))
)]
async fn countries_combo(uow: UnitOfWork) -> AppResult<Json<Vec<Country>>> {
    let rows = uow
        .repository::<CatalogRepository>()
        .countries_combo()
        .await
        .into_app_result()?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/combo/{country_id}",
    tag = CATALOG_TAG,
    params(("country_id" = i32, Path, description = "Country whose states are listed")),
    responses((status = 200, description = "States ordered by name", body = Vec<State>))
)]
async fn states_combo(
    uow: UnitOfWork,
    Path(country_id): Path<i32>,
) -> AppResult<Json<Vec<State>>> {
    let rows = uow
        .repository::<CatalogRepository>()
        .states_combo(country_id)
        .await
        .into_app_result()?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/combo/{state_id}",
    tag = CATALOG_TAG,
    params(("state_id" = i32, Path, description = "State whose cities are listed")),
    responses((status = 200, description = "Cities ordered by name", body = Vec<City>))
)]
async fn cities_combo(uow: UnitOfWork, Path(state_id): Path<i32>) -> AppResult<Json<Vec<City>>> {
    let rows = uow
        .repository::<CatalogRepository>()
        .cities_combo(state_id)
        .await
        .into_app_result()?;
    Ok(Json(rows))
}
