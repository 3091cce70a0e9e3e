//! Shared helpers for Diesel repository implementations.
//!
//! Each repository owns its port error type, so the helpers here classify
//! Diesel and pool failures once and let the repository pick the variant.

use tracing::debug;

use super::models::RowConversionError;
use super::pool::PoolError;

/// Coarse classification of a failed Diesel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// Connection dropped mid-operation.
    Connection(String),
    /// A unique index rejected the write.
    Unique { constraint: Option<String> },
    /// A `CHECK` constraint rejected the write.
    Check { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DbFailure::Unique { constraint },
                DatabaseErrorKind::CheckViolation => DbFailure::Check { constraint },
                DatabaseErrorKind::ClosedConnection => {
                    DbFailure::Connection("database connection error".to_owned())
                }
                _ => DbFailure::Query("database error".to_owned()),
            }
        }
        _ => DbFailure::Query("database error".to_owned()),
    }
}

/// Message for a row that could not be converted to its domain type.
pub(crate) fn conversion_message(error: &RowConversionError) -> String {
    debug!(%error, "row conversion failed");
    error.to_string()
}

/// Convert every row, failing on the first bad one.
pub(crate) fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, RowConversionError>
where
    T: TryFrom<R, Error = RowConversionError>,
{
    rows.into_iter().map(T::try_from).collect()
}
