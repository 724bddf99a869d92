//! Bearer-token session domain types.
//!
//! A session is a first-class row owned by the authority, not opaque
//! middleware state: the token is the bearer secret held in the client's
//! cookie, and validity is decided against `expires_at` and the owning
//! account on every verification.

use chrono::{DateTime, Utc};

use campuscrew_core::{AccountId, SessionId};

/// A logged-in administrator's session (domain type).
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID.
    pub id: SessionId,
    /// Owning account. The account outlives any given session.
    pub account_id: AccountId,
    /// Opaque high-entropy bearer token.
    pub token: String,
    /// Coarse device descriptor derived from the User-Agent.
    pub device: Option<String>,
    /// Absolute expiry; the session is invalid once this is not strictly
    /// in the future.
    pub expires_at: DateTime<Utc>,
    /// Updated on each successful verification.
    pub last_activity: DateTime<Utc>,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Owning account.
    pub account_id: AccountId,
    /// Opaque bearer token (unique key).
    pub token: String,
    /// Coarse device descriptor.
    pub device: Option<String>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
