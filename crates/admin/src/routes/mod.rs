//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check (wired in main)
//! GET  /health/ready           - Readiness check, pings the database
//!
//! # Auth
//! POST /api/auth/login         - Email + password login, sets session cookie
//! GET  /api/auth/me            - Current admin for a valid session
//! POST /api/auth/logout        - Delete session, clear cookie (idempotent)
//! POST /api/auth/password      - Change own password (revokes sessions)
//!
//! # Bootstrap (only when BACKOFFICE_ALLOW_BOOTSTRAP is set)
//! POST /api/auth/setup         - One-time creation of the first admin
//! ```

use axum::Router;
use serde::Serialize;

use campuscrew_core::{AccountId, AdminRole, Email};

use crate::models::Account;
use crate::state::AppState;

pub mod auth;
pub mod setup;

/// Build the API router.
///
/// The bootstrap endpoint is only routed when `allow_bootstrap` is set; a
/// production deployment never exposes it.
pub fn routes(allow_bootstrap: bool) -> Router<AppState> {
    let router = Router::new().merge(auth::router());

    if allow_bootstrap {
        router.merge(setup::router())
    } else {
        router
    }
}

/// Sanitized account representation returned to clients.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Optional surname.
    pub surname: Option<String>,
    /// Permission level.
    pub role: AdminRole,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            surname: account.surname,
            role: account.role,
        }
    }
}
