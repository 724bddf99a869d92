//! Administrator account domain types.

use chrono::{DateTime, Utc};

use campuscrew_core::{AccountId, AdminRole, Email};

/// An administrator account (domain type).
///
/// This is the sanitized view: the password hash never leaves the store
/// layer, so handing an `Account` to a handler or serializing it cannot
/// leak the credential.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Administrator's email address (unique, case-normalized).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Optional surname.
    pub surname: Option<String>,
    /// Permission level.
    pub role: AdminRole,
    /// Whether the account may authenticate at all.
    pub active: bool,
    /// Consecutive failed login attempts since the last success.
    pub failed_attempts: i32,
    /// When set and in the future, authentication is denied even with the
    /// correct password.
    pub locked_until: Option<DateTime<Utc>>,
    /// Last successful authentication.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Email address (unique key).
    pub email: Email,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Optional surname.
    pub surname: Option<String>,
    /// Permission level.
    pub role: AdminRole,
}
