//! Authentication route handlers.
//!
//! Login, session introspection, logout, and password change.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::{
    RequireAdminAuth, SESSION_COOKIE_NAME, clear_session_cookie, session_cookie,
};
use crate::services::auth::LoginInput;
use crate::state::AppState;

use super::AccountResponse;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/password", post(change_password))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login with email and password.
///
/// POST /api/auth/login
///
/// On success, sets the session cookie and returns the sanitized account.
/// Every credential failure answers the same 401 body.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccountResponse>), AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_owned(),
        ));
    }

    let output = state
        .auth()
        .authenticate(LoginInput {
            email: req.email,
            password: req.password,
            origin: client_origin(&headers),
            user_agent: header_str(&headers, header::USER_AGENT),
        })
        .await?;

    let jar = jar.add(session_cookie(
        output.session.token.clone(),
        state.auth().policy().session_ttl,
        state.config().cookie_secure(),
    ));

    Ok((jar, Json(output.account.into())))
}

/// Return the current admin for a valid session.
///
/// GET /api/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<AccountResponse> {
    Json(admin.into())
}

/// Logout and clear the session cookie.
///
/// POST /api/auth/logout
///
/// Always succeeds from the caller's perspective: the cookie is cleared
/// whether or not a matching session existed, and a second call is a
/// no-op.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && let Err(e) = state.auth().logout(cookie.value()).await
    {
        tracing::warn!(error = %e, "failed to delete session on logout");
    }

    let jar = jar.add(clear_session_cookie());
    (
        jar,
        Json(MessageResponse {
            message: "logged out".to_owned(),
        }),
    )
}

/// Password change request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Change the current admin's password.
///
/// POST /api/auth/password
///
/// Revokes every session the account holds, so the caller has to log in
/// again; the cookie is cleared in the same response.
async fn change_password(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    jar: CookieJar,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if req.new_password.len() < state.auth().policy().min_password_length {
        return Err(AppError::BadRequest(format!(
            "password must be at least {} characters",
            state.auth().policy().min_password_length
        )));
    }

    state
        .auth()
        .change_password(
            admin.id,
            &req.current_password,
            &req.new_password,
            client_origin(&headers).as_deref(),
        )
        .await?;

    let jar = jar.add(clear_session_cookie());
    Ok((
        jar,
        Json(MessageResponse {
            message: "password changed".to_owned(),
        }),
    ))
}

/// Best-effort client origin for the security log.
///
/// Takes the first address in `X-Forwarded-For` when present; the service
/// sits behind a reverse proxy, so the socket peer is not the client.
pub(super) fn client_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// A header value as an owned string, if it is valid UTF-8.
fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
