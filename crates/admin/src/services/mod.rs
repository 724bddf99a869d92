//! Business logic services.

pub mod auth;

pub use auth::{AuthError, AuthPolicy, AuthService, LoginInput, LoginOutput};
