//! Sign-in providers.
//!
//! Two providers are registered:
//! - [`google`] - OAuth 2.0 / `OpenID` Connect against Google (optional)
//! - [`credentials`] - Email and password checked against the `users` table
//!
//! Both produce an [`Identity`], which the `jwt` callback turns into a
//! session token.

pub mod credentials;
pub mod google;

use serde::Serialize;

use vieux_carre_core::{Email, UserRole};

pub use credentials::{Credentials, CredentialsProvider};
pub use google::{GoogleProvider, OAuthError};

/// Identity established by a provider for a single sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-scoped account ID: the user ID for credentials, Google's
    /// `sub` for OAuth.
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Email,
    pub image: Option<String>,
    pub role: Option<UserRole>,
}

/// Kind of provider, as reported by `GET /api/auth/providers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Oauth,
    Credentials,
}

/// Public description of a registered provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub signin_url: String,
    pub callback_url: String,
}

/// The registered providers.
pub struct Providers {
    pub google: Option<GoogleProvider>,
    pub credentials: CredentialsProvider,
}

impl Providers {
    /// Describe the registered providers, OAuth first.
    ///
    /// Credentials sign in through the site's own form, so its sign-in URL
    /// is the sign-in page.
    #[must_use]
    pub fn list(&self, base_url: &str, sign_in_page: &str) -> Vec<ProviderInfo> {
        let mut providers = Vec::with_capacity(2);
        if self.google.is_some() {
            providers.push(ProviderInfo {
                id: google::PROVIDER_ID,
                name: "Google",
                kind: ProviderKind::Oauth,
                signin_url: format!("{base_url}/api/auth/signin/{}", google::PROVIDER_ID),
                callback_url: format!("{base_url}/api/auth/callback/{}", google::PROVIDER_ID),
            });
        }
        providers.push(ProviderInfo {
            id: credentials::PROVIDER_ID,
            name: "Credentials",
            kind: ProviderKind::Credentials,
            signin_url: format!("{base_url}{sign_in_page}"),
            callback_url: format!("{base_url}/api/auth/callback/{}", credentials::PROVIDER_ID),
        });
        providers
    }
}
