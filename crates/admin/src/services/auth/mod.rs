//! Admin session authority.
//!
//! Gates back-office access behind password authentication with
//! brute-force lockout, and manages the lifecycle of bearer-token
//! sessions. All state lives in the stores; each call is independent.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;

use campuscrew_core::{AccountId, AdminRole, Email, SecurityEventKind};

use crate::db::{AccountStore, SecurityEventStore, SessionStore};
use crate::models::{Account, NewAccount, NewSecurityEvent, NewSession, Session};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Lockout and session policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct AuthPolicy {
    /// Consecutive failed attempts before the account locks (default: 5).
    pub max_failed_attempts: i32,
    /// How long a lockout lasts (default: 30 minutes).
    pub lockout_duration: Duration,
    /// Session lifetime from issuance (default: 24 hours).
    pub session_ttl: Duration,
    /// Minimum password length for policy enforcement (default: 8).
    pub min_password_length: usize,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
            session_ttl: Duration::hours(24),
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Caller's network origin, for the security log.
    pub origin: Option<String>,
    /// Raw User-Agent header; reduced to a coarse device descriptor.
    pub user_agent: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// The authenticated account, sanitized (no hash) and with its
    /// counters already reset.
    pub account: Account,
    /// The freshly issued session; `token` is the bearer secret.
    pub session: Session,
}

/// Authentication service.
///
/// Generic over store implementations (via trait objects) so the auth
/// layer has no dependency on a live database.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    events: Arc<dyn SecurityEventStore>,
    policy: AuthPolicy,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        events: Arc<dyn SecurityEventStore>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            accounts,
            sessions,
            events,
            policy,
        }
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    /// Whether authentication is currently denied for this email
    /// regardless of password correctness.
    ///
    /// True when the account exists and is deactivated, or carries a
    /// `locked_until` still strictly in the future. An unknown email is
    /// not "blocked"; it flows through [`Self::authenticate`]'s lookup
    /// step so the failure is logged as `email not found`.
    ///
    /// # Errors
    ///
    /// Store errors propagate; a degraded backend answers "broken", never
    /// "come in".
    pub async fn is_blocked(&self, email: &Email) -> Result<bool, AuthError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            return Ok(false);
        };

        if !account.active {
            return Ok(true);
        }

        Ok(account.locked_until.is_some_and(|until| until > Utc::now()))
    }

    /// Authenticate with email + password and issue a session.
    ///
    /// Exactly one security event is emitted on every failure path; a
    /// routine successful login emits none.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountLocked` for locked/deactivated accounts
    /// and `AuthError::InvalidCredentials` for unknown email or wrong
    /// password. Both render identically to the caller.
    pub async fn authenticate(&self, input: LoginInput) -> Result<LoginOutput, AuthError> {
        let email = Email::parse(&input.email)?;
        let origin = input.origin.as_deref();

        // 1. Lockout gate, checked before the password is even looked at.
        if self.is_blocked(&email).await? {
            self.emit(
                SecurityEventKind::AccountBlocked,
                &email,
                "attempted access to blocked account",
                origin,
            )
            .await;
            return Err(AuthError::AccountLocked);
        }

        // 2. Look up the active account.
        let Some((account, password_hash)) =
            self.accounts.find_active_with_password(&email).await?
        else {
            self.emit(SecurityEventKind::LoginFailed, &email, "email not found", origin)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        // 3. Verify the password; on mismatch, advance the lockout counter.
        if !verify_password(&input.password, &password_hash) {
            let attempts = account.failed_attempts + 1;
            let locked_until = (attempts >= self.policy.max_failed_attempts)
                .then(|| Utc::now() + self.policy.lockout_duration);

            self.accounts
                .record_failure(account.id, attempts, locked_until)
                .await?;

            if locked_until.is_some() {
                self.emit(
                    SecurityEventKind::AccountBlocked,
                    &email,
                    &format!("account locked after {attempts} failed attempts"),
                    origin,
                )
                .await;
            } else {
                self.emit(
                    SecurityEventKind::LoginFailed,
                    &email,
                    &format!(
                        "password incorrect (attempt {attempts}/{})",
                        self.policy.max_failed_attempts
                    ),
                    origin,
                )
                .await;
            }
            return Err(AuthError::InvalidCredentials);
        }

        // 4. Issue the session.
        let now = Utc::now();
        let session = self
            .sessions
            .insert(NewSession {
                account_id: account.id,
                token: generate_session_token(),
                device: input.user_agent.as_deref().map(device_descriptor),
                expires_at: now + self.policy.session_ttl,
            })
            .await?;

        // 5. Reset counters and stamp the login.
        self.accounts.record_login(account.id, now).await?;

        let account = Account {
            failed_attempts: 0,
            locked_until: None,
            last_login: Some(now),
            ..account
        };

        Ok(LoginOutput { account, session })
    }

    /// Verify a bearer token and return the owning account.
    ///
    /// Valid iff the session exists, `expires_at` is strictly in the
    /// future, and the owning account is active. Updates `last_activity`
    /// best-effort; a failed update cannot invalidate a good session.
    ///
    /// # Errors
    ///
    /// Only store errors; an invalid token is `Ok(None)`.
    pub async fn verify_session(&self, token: &str) -> Result<Option<Account>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }

        let Some((session, account)) = self.sessions.find_by_token(token).await? else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            return Ok(None);
        }

        if !account.active {
            self.emit(
                SecurityEventKind::SuspiciousActivity,
                &account.email,
                "session token presented for deactivated account",
                None,
            )
            .await;
            return Ok(None);
        }

        if let Err(e) = self.sessions.touch(session.id, Utc::now()).await {
            tracing::warn!(error = %e, session_id = %session.id, "failed to update session last_activity");
        }

        Ok(Some(account))
    }

    /// Delete the session matching `token`, if any.
    ///
    /// Idempotent: an unknown or already-deleted token is a no-op. No
    /// security event is emitted (routine action).
    ///
    /// # Errors
    ///
    /// Only store errors.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Ok(());
        }
        self.sessions.delete_by_token(token).await?;
        Ok(())
    }

    /// One-time bootstrap: create the first administrator.
    ///
    /// Permitted only while the account store is empty. The created
    /// account is a `super_admin`, active, with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyInitialized` if any account exists,
    /// `AuthError::WeakPassword` / `AuthError::InvalidEmail` on bad input.
    pub async fn create_initial_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
        surname: Option<&str>,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password, self.policy.min_password_length)?;

        if self.accounts.count().await? > 0 {
            return Err(AuthError::AlreadyInitialized);
        }

        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .insert(NewAccount {
                email,
                password_hash,
                name: name.to_owned(),
                surname: surname.map(str::to_owned),
                role: AdminRole::SuperAdmin,
            })
            .await?;

        Ok(account)
    }

    /// Change an account's password.
    ///
    /// Requires the current password, revokes every session the account
    /// holds, and emits a `password_changed` event.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong, `AuthError::WeakPassword` if the new one fails policy.
    pub async fn change_password(
        &self,
        account_id: AccountId,
        current_password: &str,
        new_password: &str,
        origin: Option<&str>,
    ) -> Result<(), AuthError> {
        let Some((account, password_hash)) =
            self.accounts.find_with_password_by_id(account_id).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(current_password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        validate_password(new_password, self.policy.min_password_length)?;
        let new_hash = hash_password(new_password)?;

        self.accounts.update_password(account.id, &new_hash).await?;
        let revoked = self.sessions.delete_for_account(account.id).await?;

        self.emit(
            SecurityEventKind::PasswordChanged,
            &account.email,
            &format!("password changed, {revoked} active sessions revoked"),
            origin,
        )
        .await;

        Ok(())
    }

    /// Append a security event, best-effort.
    ///
    /// A failed write is logged locally and swallowed; it never affects
    /// the caller's result.
    async fn emit(&self, kind: SecurityEventKind, email: &Email, detail: &str, origin: Option<&str>) {
        let event = NewSecurityEvent {
            kind,
            email: email.clone(),
            detail: detail.to_owned(),
            origin: origin.map(str::to_owned),
        };

        if let Err(e) = self.events.append(event).await {
            tracing::warn!(error = %e, kind = %kind, "failed to record security event");
        }
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a PHC-format hash.
///
/// A malformed stored hash is a non-match, never an error.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Validate password meets requirements.
fn validate_password(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.len() < min_length {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {min_length} characters"
        )));
    }

    Ok(())
}

/// Generate a fresh opaque session token: 32 random bytes, URL-safe
/// base64 without padding.
#[must_use]
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Reduce a User-Agent header to a coarse `browser/platform` descriptor.
///
/// Deliberately not a UA parser; enough to tell an operator "chrome/mac"
/// from "curl/unknown" in the session list.
#[must_use]
pub fn device_descriptor(user_agent: &str) -> String {
    let platform = if user_agent.contains("iPhone")
        || user_agent.contains("Android")
        || user_agent.contains("Mobile")
    {
        "mobile"
    } else if user_agent.contains("Macintosh") {
        "mac"
    } else if user_agent.contains("Windows") {
        "windows"
    } else if user_agent.contains("Linux") {
        "linux"
    } else {
        "unknown"
    };

    // Order matters: Chrome UAs contain "Safari", Edge UAs contain "Chrome".
    let browser = if user_agent.contains("Firefox/") {
        "firefox"
    } else if user_agent.contains("Edg/") {
        "edge"
    } else if user_agent.contains("Chrome/") {
        "chrome"
    } else if user_agent.contains("Safari/") {
        "safari"
    } else if user_agent.starts_with("curl/") {
        "curl"
    } else {
        "other"
    };

    format!("{browser}/{platform}")
}
