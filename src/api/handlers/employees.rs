//! Employee endpoints.
//!
//! Every route runs through one [`UnitOfWork`]; writes become durable when
//! the handler saves its changes.

use axum::{
    Json,
    extract::{Path, Query},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EMPLOYEE_TAG;
use crate::api::dto::{EmployeeRequest, EmployeeResponse, ErrorResponse, FilterQuery, SearchQuery};
use crate::error::{AppError, AppResult};
use crate::repositories::{EmployeeRepository, Pagination, PaginationQuery};
use crate::state::AppState;
use crate::unit_of_work::UnitOfWork;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the employee routes
///
/// # Routes
/// - `GET /` and `POST /`
/// - `GET /{id}`, `PUT /{id}` and `DELETE /{id}`
/// - `GET /search?q=`
/// - `GET /totalRecords?filter=`
/// - `GET /paginated?page=&recordsnumber=&filter=`
///
/// # Authentication
/// All routes require JWT authentication via the auth_middleware
pub fn employee_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_employees, create_employee))
        .routes(routes!(search_employees))
        .routes(routes!(total_records))
        .routes(routes!(paginated_employees))
        .routes(routes!(get_employee, update_employee, delete_employee))
}

fn to_responses(employees: Vec<crate::models::Employee>) -> Vec<EmployeeResponse> {
    employees.into_iter().map(EmployeeResponse::from).collect()
}

/// GET /api/employees - every employee ordered by name
#[utoipa::path(
    get,
    path = "/",
    tag = EMPLOYEE_TAG,
    responses(
        (status = 200, description = "All employees", body = Vec<EmployeeResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_employees(uow: UnitOfWork) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let employees = uow
        .repository::<EmployeeRepository>()
        .get_all()
        .await
        .into_app_result()?;
    Ok(Json(to_responses(employees)))
}

/// GET /api/employees/{id}
#[utoipa::path(
    get,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The employee", body = EmployeeResponse),
        (status = 404, description = "No employee has this id", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_employee(uow: UnitOfWork, Path(id): Path<i32>) -> AppResult<Json<EmployeeResponse>> {
    let employee = uow
        .repository::<EmployeeRepository>()
        .get(id)
        .await
        .into_app_result()?;
    Ok(Json(employee.into()))
}

/// POST /api/employees
///
/// Responds 201 with a `Location` header pointing at the new record.
#[utoipa::path(
    post,
    path = "/",
    tag = EMPLOYEE_TAG,
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid data or the store rejected the record", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_employee(
    uow: UnitOfWork,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> AppResult<(StatusCode, HeaderMap, Json<EmployeeResponse>)> {
    let employee = uow
        .repository::<EmployeeRepository>()
        .add(payload.into_new_employee())
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    tracing::info!(employee_id = employee.id, "Employee created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/employees/{}", employee.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(employee.into())))
}

/// PUT /api/employees/{id} - replaces every field of the employee
#[utoipa::path(
    put,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Id mismatch, invalid data or update conflict", body = ErrorResponse),
        (status = 404, description = "No employee has this id", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_employee(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> AppResult<Json<EmployeeResponse>> {
    ensure_same_id(id, payload.id)?;

    let employee = uow
        .repository::<EmployeeRepository>()
        .update(id, payload.into_changes())
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    Ok(Json(employee.into()))
}

/// DELETE /api/employees/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 400, description = "The employee has dependent records", body = ErrorResponse),
        (status = 404, description = "No employee has this id", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_employee(uow: UnitOfWork, Path(id): Path<i32>) -> AppResult<StatusCode> {
    uow.repository::<EmployeeRepository>()
        .delete(id)
        .await
        .into_app_result()?;
    uow.save_changes().await?;

    tracing::info!(employee_id = id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/employees/search?q= - first or last name contains `q`
#[utoipa::path(
    get,
    path = "/search",
    tag = EMPLOYEE_TAG,
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching employees", body = Vec<EmployeeResponse>),
        (status = 400, description = "Blank search text", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn search_employees(
    uow: UnitOfWork,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let employees = uow
        .repository::<EmployeeRepository>()
        .search_by_substring(&query.q)
        .await
        .into_app_result()?;
    Ok(Json(to_responses(employees)))
}

/// GET /api/employees/totalRecords?filter=
#[utoipa::path(
    get,
    path = "/totalRecords",
    tag = EMPLOYEE_TAG,
    params(FilterQuery),
    responses(
        (status = 200, description = "Number of matching employees", body = i64)
    ),
    security(("bearerAuth" = []))
)]
async fn total_records(uow: UnitOfWork, Query(query): Query<FilterQuery>) -> AppResult<Json<i64>> {
    let total = uow
        .repository::<EmployeeRepository>()
        .count_filtered(query.filter.as_deref())
        .await
        .into_app_result()?;
    Ok(Json(total))
}

/// GET /api/employees/paginated?page=&recordsnumber=&filter=
#[utoipa::path(
    get,
    path = "/paginated",
    tag = EMPLOYEE_TAG,
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of matching employees", body = Vec<EmployeeResponse>)
    ),
    security(("bearerAuth" = []))
)]
async fn paginated_employees(
    uow: UnitOfWork,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let pagination = Pagination::from(query);
    let employees = uow
        .repository::<EmployeeRepository>()
        .get_page_filtered(
            pagination.page(),
            pagination.records_number(),
            pagination.filter().map(str::to_string),
        )
        .await
        .into_app_result()?;
    Ok(Json(to_responses(employees)))
}

/// A body id, when given, must name the record in the path.
pub(crate) fn ensure_same_id(path_id: i32, body_id: Option<i32>) -> AppResult<()> {
    match body_id {
        Some(body_id) if body_id != path_id => Err(AppError::BadRequest {
            message: format!("Body id {} does not match path id {}", body_id, path_id),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_same_id() {
        assert!(ensure_same_id(4, None).is_ok());
        assert!(ensure_same_id(4, Some(4)).is_ok());
        assert!(matches!(
            ensure_same_id(4, Some(5)),
            Err(AppError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_routes_are_documented() {
        let (_, api) = employee_routes().split_for_parts();
        let paths: Vec<&String> = api.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.ends_with("/search")));
        assert!(paths.iter().any(|p| p.ends_with("/totalRecords")));
        assert!(paths.iter().any(|p| p.ends_with("/paginated")));
        assert!(paths.iter().any(|p| p.ends_with("/{id}")));
    }
}
