use std::ops::Deref;

use crate::db::SharedSession;
use crate::models::Employee;
use crate::models::entity::non_blank;
use crate::repositories::response::ActionResponse;
use crate::repositories::{GenericRepository, Pagination};
use crate::unit_of_work::FromSession;

/// Employee repository: generic CRUD plus name search.
///
/// Searches match first or last name, case-insensitively, anywhere in the
/// text. Results are ordered by last name, then first name, then id.
#[derive(Clone)]
pub struct EmployeeRepository {
    inner: GenericRepository<Employee>,
}

impl EmployeeRepository {
    pub fn new(session: SharedSession) -> Self {
        Self {
            inner: GenericRepository::new(session),
        }
    }

    /// Employees whose first or last name contains `text`.
    ///
    /// Blank text matches nothing and succeeds with an empty list.
    pub async fn search_by_substring(&self, text: &str) -> ActionResponse<Vec<Employee>> {
        let Some(text) = non_blank(Some(text)) else {
            return ActionResponse::success(Vec::new());
        };
        self.inner.list(Some(text), None).await
    }

    /// Count of employees matching `filter`; every employee when it is blank.
    pub async fn count_filtered(&self, filter: Option<&str>) -> ActionResponse<i64> {
        self.inner.count_matching(filter).await
    }

    pub async fn get_page_filtered(
        &self,
        page: i64,
        records_number: i64,
        filter: Option<String>,
    ) -> ActionResponse<Vec<Employee>> {
        let pagination = Pagination::new(page, records_number, filter);
        self.inner.get_page(&pagination).await
    }
}

impl Deref for EmployeeRepository {
    type Target = GenericRepository<Employee>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromSession for EmployeeRepository {
    fn from_session(session: SharedSession) -> Self {
        Self::new(session)
    }
}
