use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A page request. Out-of-range values are coerced on construction, so a
/// `Pagination` always has `page >= 1` and `records_number >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    records_number: i64,
    filter: Option<String>,
}

impl Pagination {
    pub fn new(page: i64, records_number: i64, filter: Option<String>) -> Self {
        Self {
            page: if page <= 0 { 1 } else { page },
            records_number: if records_number <= 0 {
                DEFAULT_PAGE_SIZE
            } else {
                records_number
            },
            filter: filter.filter(|f| !f.trim().is_empty()),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn records_number(&self) -> i64 {
        self.records_number
    }

    /// The filter text, `None` when it was absent or blank.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Rows to skip before this page starts.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.records_number)
    }

    /// `(offset, limit)` for the query window.
    pub fn window(&self) -> (i64, i64) {
        (self.skip(), self.records_number)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE, None)
    }
}

/// Raw query-string form: `?page=&recordsnumber=&filter=`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number; values below 1 select the first page
    pub page: Option<i64>,
    /// Page size; values below 1 select the default of 10
    #[serde(rename = "recordsnumber")]
    pub records_number: Option<i64>,
    /// Case-insensitive substring filter
    pub filter: Option<String>,
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Pagination::new(
            query.page.unwrap_or(1),
            query.records_number.unwrap_or(DEFAULT_PAGE_SIZE),
            query.filter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.records_number(), 10);
        assert_eq!(pagination.skip(), 0);
        assert_eq!(pagination.filter(), None);
    }

    #[test]
    fn test_skip_for_second_page() {
        let pagination = Pagination::new(2, 10, None);
        assert_eq!(pagination.window(), (10, 10));
    }

    #[test]
    fn test_blank_filter_is_dropped() {
        assert_eq!(Pagination::new(1, 10, Some("  ".into())).filter(), None);
        assert_eq!(Pagination::new(1, 10, Some("an".into())).filter(), Some("an"));
    }

    #[test]
    fn test_query_defaults() {
        let pagination: Pagination = PaginationQuery::default().into();
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn test_query_deserializes_recordsnumber() {
        let query: PaginationQuery =
            serde_json::from_value(serde_json::json!({"page": 3, "recordsnumber": 5})).unwrap();
        let pagination = Pagination::from(query);
        assert_eq!(pagination.window(), (10, 5));
    }

    proptest! {
        #[test]
        fn prop_non_positive_page_is_first_page(page in i64::MIN..=0, size in 1i64..1000) {
            let pagination = Pagination::new(page, size, None);
            prop_assert_eq!(pagination.page(), 1);
            prop_assert_eq!(pagination.skip(), 0);
        }

        #[test]
        fn prop_non_positive_size_defaults_to_ten(page in 1i64..1000, size in i64::MIN..=0) {
            let pagination = Pagination::new(page, size, None);
            prop_assert_eq!(pagination.records_number(), DEFAULT_PAGE_SIZE);
            prop_assert_eq!(pagination.skip(), (page - 1) * DEFAULT_PAGE_SIZE);
        }

        #[test]
        fn prop_pages_tile_without_overlap(size in 1i64..50, page in 1i64..100) {
            let current = Pagination::new(page, size, None);
            let next = Pagination::new(page + 1, size, None);
            prop_assert_eq!(current.skip() + current.records_number(), next.skip());
        }
    }
}
