//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses `{"error": code, "message": text}`.
//! Store failures are logged and answered with a fixed message; the cause
//! never reaches the client.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use atelier_core::models::ValidationError;

/// Message used when a handler gives no more specific one
pub const GENERIC_FAILURE: &str = "an internal error occurred";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body or query string could not be parsed (400)
    InvalidRequest { message: String },

    /// Missing or unknown bearer token (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Cross-schema reference check failed (409)
    Conflict { message: String },

    /// Store error (500, logged); `message` is what the client sees
    Database {
        message: &'static str,
        source: DbError,
    },
}

impl ApiError {
    /// Store failure answered with a route-specific message
    pub fn database(message: &'static str, source: DbError) -> Self {
        Self::Database { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::InvalidRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_request",
                    "message": message
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "authentication required"
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Database { message, source } => {
                // Log the actual error, return the fixed message
                tracing::error!("{}: {}", message, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": message
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Integrity { reason } => Self::Conflict { message: reason },
            _ => Self::database(GENERIC_FAILURE, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "title" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unauthorized_is_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn integrity_maps_to_409() {
        let err: ApiError = DbError::Integrity {
            reason: "owner 'x' does not exist".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_error_hides_cause() {
        let err = ApiError::database(
            "Failed to fetch support tags",
            DbError::Unavailable("connection refused on 10.0.0.7".into()),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to fetch support tags");
        assert!(!body.to_string().contains("10.0.0.7"));
    }
}
