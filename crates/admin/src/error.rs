//! Unified error handling for the back office.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the back office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication or authorization failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }

    /// Status code and caller-visible message.
    ///
    /// Every denied authentication renders one of two fixed strings:
    /// credential failures (wrong password, unknown email, locked or
    /// deactivated account) are indistinguishable to the caller, and
    /// session failures all read "not authorized". Internal failures never
    /// expose their cause.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Auth(AuthError::InvalidCredentials | AuthError::AccountLocked) => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_owned())
            }
            Self::Auth(AuthError::NotAuthorized) => {
                (StatusCode::UNAUTHORIZED, "not authorized".to_owned())
            }
            Self::Auth(AuthError::InvalidEmail(e)) => {
                (StatusCode::BAD_REQUEST, format!("invalid email: {e}"))
            }
            Self::Auth(AuthError::WeakPassword(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Auth(AuthError::AlreadyInitialized) => (
                StatusCode::CONFLICT,
                "administrators already exist".to_owned(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Database(_)
            | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_owned(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors with Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Back-office request error"
            );
        }

        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
