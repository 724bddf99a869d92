//! Postgres implementation of the account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campuscrew_core::{AccountId, AdminRole, Email};

use super::{AccountStore, RepositoryError};
use crate::models::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, email, name, surname, role, active, failed_attempts, \
     locked_until, last_login, created_at, updated_at";

/// Account store backed by `backoffice.account`.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw account row as stored.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    name: String,
    surname: Option<String>,
    role: String,
    active: bool,
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: AdminRole = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            email,
            name: row.name,
            surname: row.surname,
            role,
            active: row.active,
            failed_attempts: row.failed_attempts,
            locked_until: row.locked_until,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account row plus the password hash, for authentication paths only.
#[derive(sqlx::FromRow)]
struct AccountAuthRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM backoffice.account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_active_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountAuthRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM backoffice.account \
             WHERE email = $1 AND active"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Ok((Account::try_from(r.account)?, r.password_hash)))
            .transpose()
    }

    async fn find_with_password_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountAuthRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM backoffice.account WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Ok((Account::try_from(r.account)?, r.password_hash)))
            .transpose()
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM backoffice.account")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO backoffice.account (email, password_hash, name, surname, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(&new.surname)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Account::try_from(row)
    }

    async fn record_failure(
        &self,
        id: AccountId,
        failed_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE backoffice.account \
             SET failed_attempts = $2, locked_until = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(failed_attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE backoffice.account \
             SET failed_attempts = 0, locked_until = NULL, last_login = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE backoffice.account \
             SET password_hash = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
