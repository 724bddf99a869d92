//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::services::auth::AuthService;

/// Application state shared across all handlers.
///
/// Cheap to clone; the inner data is behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    auth: AuthService,
}

impl AppState {
    /// Build the state from loaded configuration and the auth service.
    #[must_use]
    pub fn new(config: AdminConfig, auth: AuthService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, auth }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The admin session authority.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
