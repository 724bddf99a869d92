//! HTTP middleware and extractors for the back office.
//!
//! # Request pipeline (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Route handlers; protected ones opt in via the [`RequireAdminAuth`]
//!    extractor, which resolves the session cookie against the store on
//!    every request

pub mod auth;
pub mod session;

pub use auth::RequireAdminAuth;
pub use session::{SESSION_COOKIE_NAME, clear_session_cookie, session_cookie};
