//! Repository layer for data access operations.
//!
//! Repositories share the [`Session`](crate::db::Session) of the unit of
//! work that created them and report every outcome as an
//! [`ActionResponse`].

mod catalog;
mod employee;
pub(crate) mod generic;
mod pagination;
mod response;
mod user;

pub use catalog::CatalogRepository;
pub use employee::EmployeeRepository;
pub use generic::GenericRepository;
pub use pagination::{DEFAULT_PAGE_SIZE, Pagination, PaginationQuery};
pub use response::{
    ActionResponse, FailureKind, HAS_DEPENDENTS, Operation, RECORD_EXISTS, RECORD_NOT_FOUND,
    UPDATE_CONFLICT,
};
pub use user::UserRepository;

use crate::db::SharedSession;
use crate::models::Entity;
use crate::unit_of_work::FromSession;

impl<E: Entity> FromSession for GenericRepository<E> {
    fn from_session(session: SharedSession) -> Self {
        Self::new(session)
    }
}
