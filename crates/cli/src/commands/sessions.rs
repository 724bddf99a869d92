//! Session housekeeping commands.
//!
//! # Usage
//!
//! ```bash
//! cc-cli sessions purge
//! ```
//!
//! Expired sessions are already invalid on verification; this sweep only
//! reclaims the rows. Run it from cron or by hand, never from the serving
//! path.

use chrono::Utc;

use campuscrew_admin::db::{self, PgSessionStore, SessionStore};

use super::CliError;

/// Delete sessions whose expiry has passed.
///
/// # Errors
///
/// Returns `CliError::Database` if the database is unreachable.
pub async fn purge() -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to back-office database...");
    let pool = db::create_pool(&database_url).await?;

    let sessions = PgSessionStore::new(pool);
    let deleted = sessions.delete_expired(Utc::now()).await?;

    tracing::info!("Purged {} expired session(s)", deleted);
    Ok(())
}
