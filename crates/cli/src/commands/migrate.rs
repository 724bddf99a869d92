//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cc-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BACKOFFICE_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/admin/migrations/`.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::CliError;

/// Run the back-office migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to back-office database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running back-office migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Back-office migrations complete!");
    Ok(())
}
