//! Configuration loaded from environment variables.
//!
//! ## Required
//! - `BACKOFFICE_DATABASE_URL` - `PostgreSQL` connection string
//! - `BACKOFFICE_BASE_URL` - Public URL for the back office
//!
//! ## Optional
//! - `BACKOFFICE_HOST` - Bind address (default: 127.0.0.1)
//! - `BACKOFFICE_PORT` - Listen port (default: 3001)
//! - `BACKOFFICE_ALLOW_BOOTSTRAP` - Mount the one-time setup endpoint
//!   (default: false; leave unset in production)
//! - `BACKOFFICE_MAX_FAILED_LOGINS` - Lockout threshold (default: 5)
//! - `BACKOFFICE_LOCKOUT_MINUTES` - Lockout duration (default: 30)
//! - `BACKOFFICE_SESSION_HOURS` - Session lifetime (default: 24)
//! - `BACKOFFICE_MIN_PASSWORD_LENGTH` - Password policy (default: 8)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

use crate::services::auth::AuthPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office
    pub base_url: String,
    /// Whether the one-time bootstrap endpoint is routed at all
    pub allow_bootstrap: bool,
    /// Lockout and session policy
    pub auth: AuthPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("BACKOFFICE_DATABASE_URL")?);
        let host = get_env_or_default("BACKOFFICE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKOFFICE_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("BACKOFFICE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKOFFICE_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("BACKOFFICE_BASE_URL")?;
        let allow_bootstrap = get_optional_env("BACKOFFICE_ALLOW_BOOTSTRAP")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let auth = auth_policy_from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            allow_bootstrap,
            auth,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Build the auth policy from environment overrides over defaults.
fn auth_policy_from_env() -> Result<AuthPolicy, ConfigError> {
    let defaults = AuthPolicy::default();

    let max_failed_attempts = parse_env_or(
        "BACKOFFICE_MAX_FAILED_LOGINS",
        defaults.max_failed_attempts,
    )?;
    let lockout_minutes = parse_env_or(
        "BACKOFFICE_LOCKOUT_MINUTES",
        defaults.lockout_duration.num_minutes(),
    )?;
    let session_hours =
        parse_env_or("BACKOFFICE_SESSION_HOURS", defaults.session_ttl.num_hours())?;
    let min_password_length = parse_env_or(
        "BACKOFFICE_MIN_PASSWORD_LENGTH",
        defaults.min_password_length,
    )?;

    Ok(AuthPolicy {
        max_failed_attempts,
        lockout_duration: Duration::minutes(lockout_minutes),
        session_ttl: Duration::hours(session_hours),
        min_password_length,
    })
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

/// Get an environment variable or a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Get an optional environment variable (empty counts as unset).
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable into `T`, falling back to `default` when
/// unset.
fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get_optional_env(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string())),
        None => Ok(default),
    }
}
