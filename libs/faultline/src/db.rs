//! Storage errors from sqlx.
//!
//! Constraint violations become [`Fault::DataConflict`]; everything else is
//! unclassified. Neither leaks constraint or table names to the client.

use sqlx::error::ErrorKind;

use crate::fault::Fault;

/// Whether `err` is a database constraint violation
/// (unique, foreign key, not-null or check).
#[must_use]
pub fn is_integrity_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        ),
        _ => false,
    }
}

impl From<sqlx::Error> for Fault {
    fn from(err: sqlx::Error) -> Self {
        if is_integrity_violation(&err) {
            Self::conflict(err)
        } else {
            Self::unclassified(err)
        }
    }
}
