//! Session cookie policy.
//!
//! The bearer token is the only client-held state. The cookie is HTTP-only
//! with SameSite=Strict, and carries `Secure` whenever the back office is
//! served over HTTPS. Its lifetime matches the session row's `expires_at`,
//! but the server-side expiry is authoritative either way.

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Session cookie name for the back office.
pub const SESSION_COOKIE_NAME: &str = "cc_admin_session";

/// Build the session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Build an immediately-expiring, empty cookie that clears the session
/// cookie on the client.
#[must_use]
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
