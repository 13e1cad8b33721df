//! Closed error-kind enumeration for the database layer
//!
//! Every driver failure is wrapped at the facade boundary into one of
//! these kinds; nothing backend-specific propagates past `db::`.

use thiserror::Error;

/// Database layer errors, by kind rather than by driver.
#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// Required configuration is absent or the backend type is unresolved.
    #[error("database is not configured; set DB_TYPE, DB_HOST and DB_NAME")]
    NotConfigured,

    /// The backend could not be reached or the driver reported a failure.
    #[error("database error: {message}")]
    Unreachable { message: String },

    /// Input rejected before touching the backend.
    #[error("validation failed: {reason}")]
    Validation { reason: &'static str },
}

impl DbError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        Self::unreachable(err.to_string())
    }
}

impl From<mongodb::error::Error> for DbError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::unreachable(err.to_string())
    }
}

/// Result type alias for database layer operations.
pub type DbResult<T> = Result<T, DbError>;
