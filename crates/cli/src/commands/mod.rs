//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod sessions;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Store error.
    #[error("Store error: {0}")]
    Repository(#[from] campuscrew_admin::db::RepositoryError),

    /// Auth operation failed.
    #[error("{0}")]
    Auth(#[from] campuscrew_admin::services::auth::AuthError),
}

/// The back-office database URL from the environment.
pub(crate) fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();
    std::env::var("BACKOFFICE_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("BACKOFFICE_DATABASE_URL"))
}
