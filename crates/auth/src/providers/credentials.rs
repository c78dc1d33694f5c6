//! Email and password provider.

use std::sync::Arc;

use serde::Deserialize;

use vieux_carre_core::Email;

use super::Identity;
use crate::db::UserRepository;
use crate::services::auth::verify_password;

/// Provider ID used in routes.
pub const PROVIDER_ID: &str = "credentials";

/// Email and password submitted by the sign-in form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Checks credentials against stored Argon2 hashes.
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<dyn UserRepository>,
}

impl CredentialsProvider {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Authorize a credential pair.
    ///
    /// Returns the identity (id, name, email, role) when the email belongs to
    /// a user with a password hash and the password verifies. Every other
    /// outcome, including a failed lookup, is `None`.
    pub async fn authorize(&self, credentials: Option<&Credentials>) -> Option<Identity> {
        let credentials = credentials?;

        let Ok(email) = Email::parse(&credentials.email) else {
            tracing::debug!("credentials sign-in with malformed email");
            return None;
        };

        let user = match self.users.find_by_email(&email).await {
            Ok(user) => user?,
            Err(e) => {
                tracing::error!(error = %e, "user lookup failed during authorize");
                return None;
            }
        };

        // OAuth-only accounts have no hash and can never pass this provider.
        let hash = user.password_hash.as_deref()?;
        if verify_password(&credentials.password, hash).is_err() {
            tracing::debug!(user_id = %user.id, "credentials sign-in rejected");
            return None;
        }

        Some(Identity {
            id: Some(user.id.to_string()),
            name: Some(user.name),
            email: user.email,
            image: None,
            role: Some(user.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials {
            email: "buyer@vieuxcarre.app".to_string(),
            password: "hunter2-but-longer".to_string(),
        };
        let debug_output = format!("{credentials:?}");
        assert!(debug_output.contains("buyer@vieuxcarre.app"));
        assert!(!debug_output.contains("hunter2"));
    }
}
