//! Convenience result type alias for Shipgate.

use crate::error::AppError;

/// A specialized `Result` type for Shipgate operations.
pub type AppResult<T> = Result<T, AppError>;
