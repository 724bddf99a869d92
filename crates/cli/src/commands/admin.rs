//! Administrator management commands.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first administrator (only while no accounts exist)
//! cc-cli admin create-initial -e admin@example.com -n "Admin Name" -p "a strong password"
//! ```
//!
//! # Environment Variables
//!
//! - `BACKOFFICE_DATABASE_URL` - `PostgreSQL` connection string
//!
//! This is the intended controlled deployment path for bootstrap; the
//! HTTP setup endpoint stays disabled in production.

use std::sync::Arc;

use campuscrew_admin::db::{self, PgAccountStore, PgSecurityEventStore, PgSessionStore};
use campuscrew_admin::services::auth::{AuthPolicy, AuthService};

use super::CliError;

/// Create the first administrator account.
///
/// Delegates to the session authority's guarded bootstrap operation, so
/// the store-must-be-empty rule is enforced in exactly one place.
///
/// # Errors
///
/// Returns `CliError::Auth` if accounts already exist or the input fails
/// validation, `CliError::Database` if the database is unreachable.
pub async fn create_initial(
    email: &str,
    password: &str,
    name: &str,
    surname: Option<&str>,
) -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to back-office database...");
    let pool = db::create_pool(&database_url).await?;

    let auth = AuthService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool.clone())),
        Arc::new(PgSecurityEventStore::new(pool)),
        AuthPolicy::default(),
    );

    let account = auth
        .create_initial_admin(email, password, name, surname)
        .await?;

    tracing::info!(
        "Administrator created! ID: {}, Email: {}, Role: {}",
        account.id,
        account.email,
        account.role
    );

    Ok(())
}
