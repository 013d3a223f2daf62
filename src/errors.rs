//! # Error handling for the directory API
//!
//! Every handler returns `Result<_, ApiError>`. Storage failures are logged
//! server-side with their context and the underlying [`DbErr`]; clients only
//! see a short message in the `{ "error": ... }` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// API error type with sanitized responses.
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - the requested record does not exist (or is soft-deleted)
    NotFound {
        /// Singular resource name, e.g. "student"
        resource: String,
    },

    /// 400 Bad Request - invalid path id, query string or body
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - storage failure (details logged, not exposed)
    Database {
        /// User-facing message, e.g. "failed to fetch students"
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    /// Create a 404 Not Found error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::not_found("student"));
    /// ```
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 500 error from a storage failure.
    ///
    /// `action` describes what was attempted and becomes the client message
    /// prefixed with "failed to".
    ///
    /// # Example
    /// ```rust,ignore
    /// R::count(db, &plan).await.map_err(|err| ApiError::database("count students", err))?;
    /// ```
    pub fn database(action: impl AsRef<str>, err: DbErr) -> Self {
        Self::Database {
            message: format!("failed to {}", action.as_ref()),
            internal: err,
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing (sanitized) message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::BadRequest { message } | Self::Database { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { message, internal } => {
                tracing::error!(error = ?internal, context = %message, "database error");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error body sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Failures that stop the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to initialise logging: {0}")]
    Telemetry(String),
}

impl StartupError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_startup_error_messages() {
        let err = StartupError::invalid("server.port must be non-zero");
        assert_eq!(err.to_string(), "invalid configuration: server.port must be non-zero");
    }

    #[test]
    fn test_not_found_message() {
        let error = ApiError::not_found("student");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.user_message(), "student not found");
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let error = ApiError::database(
            "fetch students",
            DbErr::Custom("relation \"students\" does not exist".into()),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.user_message(), "failed to fetch students");
        assert!(!error.to_string().contains("relation"));
    }

    #[tokio::test]
    async fn test_response_envelope_has_only_error_key() {
        let (status, body) = body_json(ApiError::bad_request("invalid student ID")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "invalid student ID" }));
    }
}
