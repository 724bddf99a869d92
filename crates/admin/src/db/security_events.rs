//! Postgres implementation of the security event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campuscrew_core::SecurityEventId;

use super::{RepositoryError, SecurityEventStore};
use crate::models::{NewSecurityEvent, SecurityEvent};

/// Security event store backed by `backoffice.security_event`.
///
/// Append-only: nothing in the application updates or deletes rows.
#[derive(Clone)]
pub struct PgSecurityEventStore {
    pool: PgPool,
}

impl PgSecurityEventStore {
    /// Create a new security event store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InsertedEventRow {
    id: i32,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl SecurityEventStore for PgSecurityEventStore {
    async fn append(&self, event: NewSecurityEvent) -> Result<SecurityEvent, RepositoryError> {
        let row = sqlx::query_as::<_, InsertedEventRow>(
            "INSERT INTO backoffice.security_event (kind, email, detail, origin) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, created_at",
        )
        .bind(event.kind.as_str())
        .bind(event.email.as_str())
        .bind(&event.detail)
        .bind(&event.origin)
        .fetch_one(&self.pool)
        .await?;

        Ok(SecurityEvent {
            id: SecurityEventId::new(row.id),
            kind: event.kind,
            email: event.email,
            detail: event.detail,
            origin: event.origin,
            created_at: row.created_at,
        })
    }
}
