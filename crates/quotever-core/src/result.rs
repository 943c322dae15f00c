//! Convenience result type alias for quotever.

use crate::error::AppError;

/// A specialized `Result` type for quotever operations.
pub type AppResult<T> = Result<T, AppError>;
