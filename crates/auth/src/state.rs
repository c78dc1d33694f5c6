//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AuthConfig;
use crate::runtime::AuthRuntime;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The pool is optional so the router can be
/// exercised against in-memory repositories.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AuthConfig,
    pool: Option<PgPool>,
    runtime: AuthRuntime,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AuthConfig, pool: Option<PgPool>, runtime: AuthRuntime) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                runtime,
            }),
        }
    }

    /// Get a reference to the auth configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Get the database pool, if one is attached.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the auth runtime.
    #[must_use]
    pub fn auth(&self) -> &AuthRuntime {
        &self.inner.runtime
    }
}
