//! API error type with status-code mapping
//!
//! Database error kinds and handler-level conditions become JSON error
//! bodies with the appropriate HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

#[derive(Debug)]
pub enum ApiError {
    /// Database not configured (503)
    NotConfigured,

    /// Request rejected before touching the backend (400)
    Validation(&'static str),

    /// Requested item does not exist (404)
    NotFound,

    /// Backend/driver failure (500, logged)
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                DbError::NotConfigured.to_string(),
            ),
            Self::Validation(reason) => (StatusCode::BAD_REQUEST, reason.to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Self::Internal(message) => {
                tracing::error!("Database error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotConfigured => Self::NotConfigured,
            DbError::Validation { reason } => Self::Validation(reason),
            DbError::Unreachable { message } => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_configured_is_503() {
        let response = ApiError::NotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn validation_is_400() {
        let response = ApiError::Validation("name is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn driver_failure_is_500() {
        let err: ApiError = DbError::unreachable("connection refused").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
