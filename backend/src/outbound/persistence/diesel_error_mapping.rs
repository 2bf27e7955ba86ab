//! Translation of Diesel and pool failures into [`RepositoryError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Checkout and build failures mean the database cannot serve the call.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    debug!(%error, "connection checkout failed");
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::unavailable(message)
        }
    }
}

/// Classify a Diesel error by kind.
///
/// Missing rows become `NotFound`, integrity violations become
/// `ConstraintViolation` (named after the violated constraint when Postgres
/// reports one), and everything else is `Unavailable`.
pub(crate) fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => RepositoryError::not_found("record not found"),
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation,
            info,
        ) => RepositoryError::constraint_violation(
            info.constraint_name().unwrap_or(info.message()),
        ),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::unavailable("database connection error")
        }
        _ => RepositoryError::unavailable("database error"),
    }
}
