use crate::error::constraint_parser::Violation;
use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint violations become `Duplicate` or `Validation` errors carrying
/// the offending table and field. A lost connection or a broken transaction
/// manager becomes `Unavailable`.
pub struct DatabaseErrorConverter;

/// Server messages for SQLSTATE class 08 and 57P0x, which the driver
/// reports without a dedicated error kind.
const CONNECTION_LOSS_MARKERS: &[&str] = &[
    "terminating connection",
    "the database system is",
    "connection does not exist",
    "connection failure",
    "connection closed",
    "server closed the connection",
];

impl DatabaseErrorConverter {
    /// True when `error` means the connection is gone, not that the
    /// statement was rejected.
    pub fn is_connection_loss(error: &DieselError) -> bool {
        match error {
            DieselError::BrokenTransactionManager => true,
            DieselError::DatabaseError(kind, info) => {
                matches!(
                    kind,
                    DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand
                ) || Self::mentions_connection_loss(info.message())
            }
            _ => false,
        }
    }

    fn mentions_connection_loss(message: &str) -> bool {
        let message = message.to_lowercase();
        CONNECTION_LOSS_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }

    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            DieselError::BrokenTransactionManager => AppError::Unavailable {
                message: format!("{}: transaction manager is broken", operation),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        if matches!(
            kind,
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand
        ) || Self::mentions_connection_loss(message)
        {
            return AppError::Unavailable {
                message: format!("{}: connection lost ({})", operation, message),
            };
        }
        let violation = Self::violation(info);

        match (kind, violation) {
            (DatabaseErrorKind::UniqueViolation, Some(v)) => AppError::Duplicate {
                entity: v.table,
                field: v.field,
                value: v.value.unwrap_or_default(),
            },
            (DatabaseErrorKind::NotNullViolation, Some(v)) => AppError::Validation {
                field: v.field,
                reason: format!("Field is required for {}", v.table),
            },
            (DatabaseErrorKind::ForeignKeyViolation, Some(v)) => AppError::Validation {
                field: v.field,
                reason: match v.value {
                    Some(value) => format!("Invalid reference to {} with value '{}'", v.table, value),
                    None => format!("Invalid reference to {}", v.table),
                },
            },
            (DatabaseErrorKind::CheckViolation, Some(v)) => AppError::Validation {
                field: v.field,
                reason: format!("Check constraint failed for {} field", v.table),
            },
            (DatabaseErrorKind::SerializationFailure, _) => AppError::Unavailable {
                message: format!("{}: serialization failure, retry the operation", operation),
            },
            (kind, _) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{}: {}", Self::kind_label(&kind), message)),
            },
        }
    }

    fn violation(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> Option<Violation> {
        let text = match info.details() {
            Some(details) => format!("{}\n{}", info.message(), details),
            None => info.message().to_string(),
        };
        ConstraintParser::parse(
            &text,
            info.table_name(),
            info.column_name(),
            info.constraint_name(),
        )
    }

    fn kind_label(kind: &DatabaseErrorKind) -> &'static str {
        match kind {
            DatabaseErrorKind::UniqueViolation => "Unique constraint violation",
            DatabaseErrorKind::ForeignKeyViolation => "Foreign key constraint violation",
            DatabaseErrorKind::NotNullViolation => "Not null constraint violation",
            DatabaseErrorKind::CheckViolation => "Check constraint violation",
            _ => "Database error",
        }
    }
}
