//! Persistence layer for the back-office `PostgreSQL` database.
//!
//! # Database: `campuscrew_backoffice`
//!
//! ## Tables
//!
//! - `backoffice.account` - Administrator accounts (credentials, lockout state)
//! - `backoffice.session` - Bearer-token sessions
//! - `backoffice.security_event` - Append-only security audit log
//!
//! # Store traits
//!
//! The authority is written against the [`AccountStore`], [`SessionStore`]
//! and [`SecurityEventStore`] traits so the auth layer has no dependency on
//! a live database; the Postgres implementations live in this module's
//! submodules and tests provide in-memory ones.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p campuscrew-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use campuscrew_core::{AccountId, Email, SessionId};

use crate::models::{Account, NewAccount, NewSecurityEvent, NewSession, SecurityEvent, Session};

pub mod accounts;
pub mod security_events;
pub mod sessions;

pub use accounts::PgAccountStore;
pub use security_events::PgSecurityEventStore;
pub use sessions::PgSessionStore;

/// Errors that can occur in store operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data is invalid (e.g. an email or role that no longer parses).
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// Every call through the pool is bounded: connection acquisition times out
/// after 10 seconds and each statement is capped at 5 seconds server-side,
/// so a degraded database surfaces as a store error instead of a hung
/// request.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                use sqlx::Executor;
                conn.execute("SET statement_timeout = '5s'").await?;
                Ok(())
            })
        })
        .connect(database_url.expose_secret())
        .await
}

/// Store of administrator accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by normalized email, regardless of `active`.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an active account by normalized email, together with its
    /// password hash. The hash stays inside the auth layer.
    async fn find_active_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Look up an account by ID together with its password hash.
    async fn find_with_password_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Total number of accounts, active or not. Guards bootstrap.
    async fn count(&self) -> Result<i64, RepositoryError>;

    /// Insert a new account.
    async fn insert(&self, new: NewAccount) -> Result<Account, RepositoryError>;

    /// Persist an updated failure counter and (possibly) lock timestamp.
    async fn record_failure(
        &self,
        id: AccountId,
        failed_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError>;

    /// Persist a successful login: zero the counter, clear the lock, set
    /// `last_login`.
    async fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError>;

    /// Replace the stored password hash.
    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;
}

/// Store of bearer-token sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session.
    async fn insert(&self, new: NewSession) -> Result<Session, RepositoryError>;

    /// Single indexed lookup of a session by token, joined to its owning
    /// account. Expiry and account state are judged by the caller.
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Session, Account)>, RepositoryError>;

    /// Update `last_activity`.
    async fn touch(&self, id: SessionId, at: DateTime<Utc>) -> Result<(), RepositoryError>;

    /// Delete the session matching `token`, if any. Returns the number of
    /// rows deleted (0 or 1); deleting a missing token is not an error.
    async fn delete_by_token(&self, token: &str) -> Result<u64, RepositoryError>;

    /// Delete all sessions belonging to an account (e.g. on password
    /// change). Returns the number of rows deleted.
    async fn delete_for_account(&self, account_id: AccountId) -> Result<u64, RepositoryError>;

    /// Delete sessions whose `expires_at` is at or before `now`. Used by
    /// the CLI housekeeping sweep; verification never depends on it.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

/// Append-only store of security events.
#[async_trait]
pub trait SecurityEventStore: Send + Sync {
    /// Append an event. Callers treat failures as best-effort.
    async fn append(&self, event: NewSecurityEvent) -> Result<SecurityEvent, RepositoryError>;
}
