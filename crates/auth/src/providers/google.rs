//! Google OAuth 2.0 provider.
//!
//! # OAuth Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the browser to Google's consent page
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code and fetch the userinfo with `authenticate()`

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use vieux_carre_core::{Email, EmailError};

use super::Identity;
use crate::config::GoogleConfig;

/// Provider ID used in routes.
pub const PROVIDER_ID: &str = "google";

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the Google OAuth exchange.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("userinfo request failed: {0}")]
    UserInfo(String),
    #[error("provider returned no email")]
    MissingEmail,
    #[error("provider email is not verified")]
    UnverifiedEmail,
    #[error("provider returned an invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subset of the `OpenID` Connect userinfo response.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleUserInfo {
    /// Convert to an identity. Google must vouch for the email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is missing, unverified or malformed.
    pub fn into_identity(self) -> Result<Identity, OAuthError> {
        let raw_email = self.email.ok_or(OAuthError::MissingEmail)?;
        if self.email_verified == Some(false) {
            return Err(OAuthError::UnverifiedEmail);
        }

        Ok(Identity {
            id: Some(self.sub),
            name: self.name.filter(|n| !n.trim().is_empty()),
            email: Email::parse(&raw_email)?,
            image: self.picture,
            role: None,
        })
    }
}

/// Client for Google sign-in.
#[derive(Clone)]
pub struct GoogleProvider {
    inner: Arc<GoogleProviderInner>,
}

struct GoogleProviderInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

impl GoogleProvider {
    /// Create a provider whose callback lives under `base_url`.
    #[must_use]
    pub fn new(config: &GoogleConfig, base_url: &str) -> Self {
        Self {
            inner: Arc::new(GoogleProviderInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                redirect_uri: format!("{base_url}/api/auth/callback/{PROVIDER_ID}"),
            }),
        }
    }

    /// The callback URL registered with Google.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.inner.redirect_uri
    }

    /// Build the consent-page URL.
    ///
    /// `state` is a random value also stored in a cookie to prevent CSRF.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code and resolve the Google identity.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP call fails or the userinfo lacks a
    /// verified email.
    pub async fn authenticate(&self, code: &str) -> Result<Identity, OAuthError> {
        let access_token = self.exchange_code(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        info.into_identity()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
        ];

        let response = self.inner.client.post(TOKEN_URL).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(text));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::UserInfo(text));
        }

        Ok(response.json().await?)
    }
}
