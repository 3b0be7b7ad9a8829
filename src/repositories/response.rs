//! Result envelope returned by every data-access operation.

use diesel::result::DatabaseErrorKind;
use serde::Serialize;

use crate::error::{AppError, AppResult, DatabaseErrorConverter};

pub const RECORD_NOT_FOUND: &str = "Record not found.";
pub const RECORD_EXISTS: &str = "Record already exists.";
pub const UPDATE_CONFLICT: &str = "Conflict updating the record.";
pub const HAS_DEPENDENTS: &str =
    "The record cannot be deleted because it has dependent records.";

/// Repository operation, used to word store rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Fixed message for the rejection this operation expects from the store.
    fn rejection_message(&self, kind: &DatabaseErrorKind) -> Option<&'static str> {
        match (self, kind) {
            (Operation::Add, DatabaseErrorKind::UniqueViolation) => Some(RECORD_EXISTS),
            (Operation::Update, DatabaseErrorKind::UniqueViolation) => Some(UPDATE_CONFLICT),
            (Operation::Delete, DatabaseErrorKind::ForeignKeyViolation) => Some(HAS_DEPENDENTS),
            _ => None,
        }
    }
}

/// Why a data-access operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Validation,
    Constraint,
    Transient,
    Unknown,
}

impl FailureKind {
    /// Classifies a raw store error.
    pub fn of_diesel(error: &diesel::result::Error) -> Self {
        use diesel::result::Error;

        if DatabaseErrorConverter::is_connection_loss(error) {
            return FailureKind::Transient;
        }
        match error {
            Error::NotFound => FailureKind::NotFound,
            Error::DatabaseError(kind, _) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation => FailureKind::Constraint,
                DatabaseErrorKind::SerializationFailure => FailureKind::Transient,
                _ => FailureKind::Unknown,
            },
            _ => FailureKind::Unknown,
        }
    }

    /// Classifies an infrastructure error raised around the query itself.
    pub fn of_app_error(error: &AppError) -> Self {
        match error {
            AppError::NotFound { .. } => FailureKind::NotFound,
            AppError::Validation { .. }
            | AppError::ValidationErrors { .. }
            | AppError::BadRequest { .. } => FailureKind::Validation,
            AppError::Duplicate { .. } => FailureKind::Constraint,
            AppError::Rejected { kind, .. } => *kind,
            e if e.is_transient() => FailureKind::Transient,
            _ => FailureKind::Unknown,
        }
    }
}

/// Outcome of one repository call.
///
/// A success always carries a result and no message; a failure carries a
/// message and a [`FailureKind`] but no result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse<T> {
    was_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
}

impl<T> ActionResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            was_success: true,
            result: Some(result),
            message: None,
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            was_success: false,
            result: None,
            message: Some(message.into()),
            failure: Some(kind),
        }
    }

    pub fn not_found() -> Self {
        Self::failure(FailureKind::NotFound, RECORD_NOT_FOUND)
    }

    /// Failure for a store error raised by `operation`.
    pub fn from_diesel(error: diesel::result::Error, operation: Operation) -> Self {
        let kind = FailureKind::of_diesel(&error);
        if kind == FailureKind::NotFound {
            return Self::not_found();
        }
        if let diesel::result::Error::DatabaseError(db_kind, _) = &error
            && let Some(message) = operation.rejection_message(db_kind)
        {
            return Self::failure(kind, message);
        }
        let converted = DatabaseErrorConverter::convert_diesel_error(error, operation.as_str());
        Self::failure(kind, converted.to_string())
    }

    pub fn from_app_error(error: &AppError) -> Self {
        Self::failure(FailureKind::of_app_error(error), error.to_string())
    }

    pub fn was_success(&self) -> bool {
        self.was_success
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Splits the envelope into the payload or the failure tag and message.
    pub fn into_result(self) -> Result<T, (FailureKind, String)> {
        match (self.result, self.failure) {
            (Some(result), None) => Ok(result),
            (_, kind) => Err((
                kind.unwrap_or(FailureKind::Unknown),
                self.message.unwrap_or_default(),
            )),
        }
    }

    /// The payload, or the failure as [`AppError::Rejected`].
    pub fn into_app_result(self) -> AppResult<T> {
        self.into_result()
            .map_err(|(kind, message)| AppError::Rejected { kind, message })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResponse<U> {
        ActionResponse {
            was_success: self.was_success,
            result: self.result.map(f),
            message: self.message,
            failure: self.failure,
        }
    }
}
