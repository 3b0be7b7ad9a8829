use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const EMPLOYEE_TAG: &str = "Employees";
pub const ACCOUNT_TAG: &str = "Accounts";
pub const CATALOG_TAG: &str = "Catalogs";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taller",
        description = "Employees, users and lookup catalogs",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::FieldError,
            crate::api::dto::CategoryRequest,
            crate::api::dto::CountryRequest,
            crate::api::dto::StateRequest,
            crate::api::dto::CityRequest,
            crate::models::Category,
            crate::models::Country,
            crate::models::State,
            crate::models::City,
            crate::models::UserType,
        )
    ),
    tags(
        (name = EMPLOYEE_TAG, description = "Employee records, search and paging"),
        (name = ACCOUNT_TAG, description = "Registration and login"),
        (name = CATALOG_TAG, description = "Categories, countries, states and cities"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer Token Authentication"))
                        .build(),
                ),
            )
        }
    }
}
