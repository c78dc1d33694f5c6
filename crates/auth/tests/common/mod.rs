//! Common test utilities for vieux-carre-auth integration tests.

#![allow(dead_code, clippy::unwrap_used)]

pub mod mock_repos;

use std::sync::Arc;

use secrecy::SecretString;

use vieux_carre_auth::callbacks::ProtectedRoutes;
use vieux_carre_auth::config::{AuthConfig, Environment};
use vieux_carre_auth::services::auth::hash_password;
use vieux_carre_auth::{AppState, AuthRuntime};
use vieux_carre_core::{Email, UserRole};

pub use mock_repos::{MockBagRepository, MockUserRepository};

/// Signing secret used by every test runtime.
pub const TEST_SECRET: &str = "q8Zr4vN1xW7pK2sT9mB6cH3jL5dF0gYa";

/// Configuration with no database, no Google and a development cookie.
pub fn test_config() -> AuthConfig {
    AuthConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "https://vieuxcarre.app".to_string(),
        environment: Environment::Test,
        secret: SecretString::from(TEST_SECRET),
        cookie_domain: ".vieuxcarre.app".to_string(),
        google: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// In-memory stores plus a runtime over them.
pub struct TestAuth {
    pub users: MockUserRepository,
    pub bags: MockBagRepository,
    pub runtime: AuthRuntime,
}

impl TestAuth {
    /// Runtime with the built-in callbacks only.
    pub fn new() -> Self {
        let users = MockUserRepository::new();
        let bags = MockBagRepository::new();
        let runtime = AuthRuntime::new(
            &test_config(),
            Arc::new(users.clone()),
            Arc::new(bags.clone()),
        );
        Self {
            users,
            bags,
            runtime,
        }
    }

    /// Runtime with route protection, as the binary configures it.
    pub fn protected() -> Self {
        let mut auth = Self::new();
        auth.runtime = auth.runtime.with_hook(Box::new(ProtectedRoutes::default()));
        auth
    }

    /// Wrap the runtime in application state for router tests.
    pub fn into_state(self) -> (AppState, MockUserRepository, MockBagRepository) {
        let state = AppState::new(test_config(), None, self.runtime);
        (state, self.users, self.bags)
    }
}

/// Seed a credential user with `password`.
pub fn seed_credential_user(
    users: &MockUserRepository,
    email: &str,
    name: &str,
    password: &str,
    role: UserRole,
) -> vieux_carre_auth::models::UserRecord {
    users.insert_user(
        name,
        Email::parse(email).unwrap(),
        Some(hash_password(password).unwrap()),
        role,
    )
}
