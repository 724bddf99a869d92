//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// The first three variants are ordinary authentication-logic outcomes and
/// all render as the same generic message at the HTTP boundary; only the
/// security log records which one actually happened.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account is locked out or deactivated.
    #[error("account locked")]
    AccountLocked,

    /// Session token is missing, unknown, or expired.
    #[error("not authorized")]
    NotAuthorized,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] campuscrew_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bootstrap attempted while accounts already exist.
    #[error("administrators already exist")]
    AlreadyInitialized,

    /// Store/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
