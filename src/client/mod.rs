//! HTTP client for the Taller API.
//!
//! Used by front ends and tooling. Every call returns either the decoded
//! body or a [`ClientError`] whose message is ready to show to a user.

mod api_client;
mod error;

pub use api_client::{ApiClient, DEFAULT_TIMEOUT};
pub use error::{ClientError, error_message};
