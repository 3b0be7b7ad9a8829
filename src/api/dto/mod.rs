//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `employee` - Employee request/response bodies
//! - `catalog` - Category, country, state and city request bodies
//! - `auth` - Registration, login and token bodies
//! - `error` - Common error response DTOs
//! - `pagination` - Search and filter query strings

mod auth;
mod catalog;
mod employee;
mod error;
mod health;
mod pagination;

pub use auth::{LoginRequest, RegisterRequest, TokenResponse};
pub use catalog::{CategoryRequest, CityRequest, CountryRequest, StateRequest};
pub use employee::{EmployeeRequest, EmployeeResponse};
pub use error::{ErrorResponse, FieldError};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{FilterQuery, SearchQuery};
