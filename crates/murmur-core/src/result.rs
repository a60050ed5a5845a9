//! Convenience result type alias for Murmur.

use crate::error::AppError;

/// A specialized `Result` type for Murmur operations.
pub type AppResult<T> = Result<T, AppError>;
