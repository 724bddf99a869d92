//! Append-only security event records.

use chrono::{DateTime, Utc};

use campuscrew_core::{Email, SecurityEventId, SecurityEventKind};

/// A recorded security event.
#[derive(Debug, Clone)]
pub struct SecurityEvent {
    /// Unique event ID.
    pub id: SecurityEventId,
    /// What happened.
    pub kind: SecurityEventKind,
    /// Target email (the account the event is about, whether or not it
    /// exists).
    pub email: Email,
    /// Free-text detail.
    pub detail: String,
    /// Network origin of the request, when known.
    pub origin: Option<String>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Fields required to append a new security event.
#[derive(Debug, Clone)]
pub struct NewSecurityEvent {
    /// What happened.
    pub kind: SecurityEventKind,
    /// Target email.
    pub email: Email,
    /// Free-text detail.
    pub detail: String,
    /// Network origin of the request, when known.
    pub origin: Option<String>,
}
