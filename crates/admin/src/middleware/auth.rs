//! Authentication extractor for protected routes.
//!
//! Provides an extractor that requires a valid admin session in route
//! handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::models::Account;
use crate::services::auth::AuthError;
use crate::state::AppState;

use super::session::SESSION_COOKIE_NAME;

/// Extractor that requires a valid admin session.
///
/// Resolves the session cookie against the session store on every request
/// (one indexed lookup). Rejects with a 401 "not authorized" body when the
/// cookie is absent, unknown, expired, or belongs to a deactivated
/// account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub Account);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned())
            .unwrap_or_default();

        let account = state
            .auth()
            .verify_session(&token)
            .await?
            .ok_or(AppError::Auth(AuthError::NotAuthorized))?;

        Ok(Self(account))
    }
}
