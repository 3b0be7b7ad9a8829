//! Query-string DTOs for search, counting and paging.
//!
//! The paging query itself is [`PaginationQuery`](crate::repositories::PaginationQuery).

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

/// `?q=` for substring search.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text to look for in first or last names
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    #[param(example = "an")]
    pub q: String,
}

/// `?filter=` for filtered counts.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterQuery {
    /// Case-insensitive substring filter; blank counts every record
    pub filter: Option<String>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("required")
            .with_message("Search text is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_invalid() {
        let query = SearchQuery { q: "  ".to_string() };
        assert!(query.validate().is_err());
        assert!(SearchQuery::default().validate().is_err());
    }

    #[test]
    fn test_search_text_is_valid() {
        let query = SearchQuery { q: "an".to_string() };
        assert!(query.validate().is_ok());
    }
}
