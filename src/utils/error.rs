//! Unified error handling
//!
//! [`AppError`] is the single application error type; every variant maps to
//! an HTTP status plus a machine-readable error kind:
//!
//! | Kind | HTTP |
//! |------|------|
//! | `validation` | 400 |
//! | `invalid_transition` | 400 |
//! | `not_found` | 404 |
//! | `conflict` | 409 |
//! | `already_closed` | 409 |
//! | `unauthorized` / `token_expired` / `invalid_token` | 401 |
//! | `database` / `internal` | 500 |
//!
//! Response body shape: `{"error": "<kind>", "message": "<human readable>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error kind
    pub error: &'static str,
    /// Human-readable message
    pub message: String,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    // ========== Business logic (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Day already closed: {0}")]
    AlreadyClosed(String),

    // ========== System (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Unified message to prevent username enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyClosed(_) => "already_closed",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::TokenExpired | AppError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::AlreadyClosed(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Do not leak internals to clients
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            error: self.kind(),
            message,
        });

        (self.status(), body).into_response()
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_and_statuses() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST, "validation"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "not_found"),
            (
                AppError::InvalidTransition("x".into()),
                StatusCode::BAD_REQUEST,
                "invalid_transition",
            ),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "conflict"),
            (AppError::AlreadyClosed("x".into()), StatusCode::CONFLICT, "already_closed"),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "database"),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.kind(), kind);
        }
    }
}
