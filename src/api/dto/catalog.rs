//! Request bodies for the lookup catalogs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewCategory, NewCity, NewCountry, NewState};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Tecnología")]
    pub name: String,
}

impl From<CategoryRequest> for NewCategory {
    fn from(request: CategoryRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountryRequest {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Colombia")]
    pub name: String,
}

impl From<CountryRequest> for NewCountry {
    fn from(request: CountryRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StateRequest {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Antioquia")]
    pub name: String,
    #[validate(range(min = 1, message = "Country is required"))]
    pub country_id: i32,
}

impl From<StateRequest> for NewState {
    fn from(request: StateRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            country_id: request.country_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CityRequest {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Medellín")]
    pub name: String,
    #[validate(range(min = 1, message = "State is required"))]
    pub state_id: i32,
}

impl From<CityRequest> for NewCity {
    fn from(request: CityRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            state_id: request.state_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_request_requires_country() {
        let request: StateRequest =
            serde_json::from_str(r#"{"name": "Antioquia", "countryId": 0}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("country_id"));
    }

    #[test]
    fn test_name_is_trimmed() {
        let request = CountryRequest {
            id: None,
            name: "  Colombia ".to_string(),
        };
        assert!(request.validate().is_ok());
        assert_eq!(NewCountry::from(request).name, "Colombia");
    }

    #[test]
    fn test_overlong_name_rejected() {
        let request = CategoryRequest {
            id: None,
            name: "a".repeat(101),
        };
        assert!(request.validate().is_err());
    }
}
