//! Postgres implementation of the session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campuscrew_core::{AccountId, AdminRole, Email, SessionId};

use super::{RepositoryError, SessionStore};
use crate::models::{Account, NewSession, Session};

/// Session store backed by `backoffice.session`.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw session row as stored.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i32,
    account_id: i32,
    token: String,
    device: Option<String>,
    expires_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: SessionId::new(row.id),
            account_id: AccountId::new(row.account_id),
            token: row.token,
            device: row.device,
            expires_at: row.expires_at,
            last_activity: row.last_activity,
            created_at: row.created_at,
        }
    }
}

/// Joined session + owning account row for token verification.
#[derive(sqlx::FromRow)]
struct SessionJoinRow {
    session_id: i32,
    account_id: i32,
    token: String,
    device: Option<String>,
    expires_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    session_created_at: DateTime<Utc>,
    email: String,
    name: String,
    surname: Option<String>,
    role: String,
    active: bool,
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
    account_created_at: DateTime<Utc>,
    account_updated_at: DateTime<Utc>,
}

fn split_join_row(row: SessionJoinRow) -> Result<(Session, Account), RepositoryError> {
    let email = Email::parse(&row.email)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;
    let role: AdminRole = row
        .role
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    let session = Session {
        id: SessionId::new(row.session_id),
        account_id: AccountId::new(row.account_id),
        token: row.token,
        device: row.device,
        expires_at: row.expires_at,
        last_activity: row.last_activity,
        created_at: row.session_created_at,
    };

    let account = Account {
        id: AccountId::new(row.account_id),
        email,
        name: row.name,
        surname: row.surname,
        role,
        active: row.active,
        failed_attempts: row.failed_attempts,
        locked_until: row.locked_until,
        last_login: row.last_login,
        created_at: row.account_created_at,
        updated_at: row.account_updated_at,
    };

    Ok((session, account))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, new: NewSession) -> Result<Session, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO backoffice.session (account_id, token, device, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, account_id, token, device, expires_at, last_activity, created_at",
        )
        .bind(new.account_id.as_i32())
        .bind(&new.token)
        .bind(&new.device)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("session token already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Session, Account)>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionJoinRow>(
            "SELECT s.id AS session_id, s.account_id, s.token, s.device, s.expires_at, \
                    s.last_activity, s.created_at AS session_created_at, \
                    a.email, a.name, a.surname, a.role, a.active, a.failed_attempts, \
                    a.locked_until, a.last_login, a.created_at AS account_created_at, \
                    a.updated_at AS account_updated_at \
             FROM backoffice.session s \
             JOIN backoffice.account a ON a.id = s.account_id \
             WHERE s.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(split_join_row).transpose()
    }

    async fn touch(&self, id: SessionId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE backoffice.session SET last_activity = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM backoffice.session WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_for_account(&self, account_id: AccountId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM backoffice.session WHERE account_id = $1")
            .bind(account_id.as_i32())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM backoffice.session WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
