//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod account_service;

pub use account_service::{AccountService, normalize_email};
