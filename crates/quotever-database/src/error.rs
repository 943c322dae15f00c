//! Mapping of sqlx failures into [`AppError`].

use quotever_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error with context.
///
/// Unique-constraint violations become [`ErrorKind::Conflict`]: the only
/// unique constraints on version rows are the per-document version number
/// and the single active row, and hitting either means a concurrent writer
/// won.
pub fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let is_unique_violation = matches!(
        &err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    );

    if is_unique_violation {
        AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: concurrent modification"),
            err,
        )
    } else {
        AppError::with_source(ErrorKind::Database, format!("{context}: {err}"), err)
    }
}
