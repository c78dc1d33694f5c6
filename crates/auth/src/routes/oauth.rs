//! Google OAuth route handlers.
//!
//! - Sign-in: stores a random state in a short-lived cookie and redirects to
//!   Google's consent page
//! - Callback: checks the state, exchanges the code and signs the user in

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;

use super::auth::{safe_callback_url, signed_in};
use crate::error::Result;
use crate::policy::GUEST_BAG_COOKIE_NAME;
use crate::providers::google::PROVIDER_ID;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Cookie holding the CSRF state between sign-in and callback.
pub const OAUTH_STATE_COOKIE: &str = "vc.oauth-state";

/// Cookie holding where to go after the callback.
pub const OAUTH_CALLBACK_COOKIE: &str = "vc.callback-url";

const OAUTH_COOKIE_PATH: &str = "/api/auth";
const OAUTH_COOKIE_MAX_AGE_SECONDS: i64 = 10 * 60;
const STATE_LENGTH: usize = 32;

/// Error code for a failed OAuth callback.
pub const OAUTH_CALLBACK_ERROR: &str = "OAuthCallback";

/// Query parameters for `GET /api/auth/signin/google`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInQuery {
    pub callback_url: Option<String>,
}

/// Query parameters from Google's redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if the user denied consent.
    pub error: Option<String>,
}

fn random_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

fn oauth_cookie(state: &AppState, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(OAUTH_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(state.auth().policy().cookie.secure)
        .max_age(time::Duration::seconds(OAUTH_COOKIE_MAX_AGE_SECONDS))
        .build()
}

fn clear_oauth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path(OAUTH_COOKIE_PATH))
        .remove(Cookie::build(OAUTH_CALLBACK_COOKIE).path(OAUTH_COOKIE_PATH))
}

fn error_redirect(state: &AppState, jar: CookieJar) -> Response {
    let location = format!(
        "{}?error={OAUTH_CALLBACK_ERROR}",
        state.auth().policy().pages.error
    );
    (clear_oauth_cookies(jar), Redirect::to(&location)).into_response()
}

/// `GET /api/auth/signin/google`
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SignInQuery>,
) -> Result<Response> {
    let google = state
        .auth()
        .google()
        .ok_or_else(|| AuthError::ProviderNotConfigured(PROVIDER_ID.to_string()))?;

    let oauth_state = random_state();
    let auth_url = google.authorization_url(&oauth_state);
    let callback = safe_callback_url(query.callback_url.as_deref(), state.auth().base_url());

    let jar = jar
        .add(oauth_cookie(&state, OAUTH_STATE_COOKIE, oauth_state))
        .add(oauth_cookie(&state, OAUTH_CALLBACK_COOKIE, callback));

    Ok((jar, Redirect::to(&auth_url)).into_response())
}

/// `GET /api/auth/callback/google`
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let google = state
        .auth()
        .google()
        .ok_or_else(|| AuthError::ProviderNotConfigured(PROVIDER_ID.to_string()))?;

    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Google sign-in denied");
        return Ok(error_redirect(&state, jar));
    }

    let stored_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("Google callback missing code or state");
        return Ok(error_redirect(&state, jar));
    };
    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Google callback state mismatch");
        return Ok(error_redirect(&state, jar));
    }

    let identity = match google.authenticate(&code).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Google code exchange failed");
            return Ok(error_redirect(&state, jar));
        }
    };

    let guest_bag = jar.get(GUEST_BAG_COOKIE_NAME).map(|c| c.value().to_string());
    let issued = state
        .auth()
        .sign_in_with_oauth(&identity, guest_bag.as_deref())
        .await?;
    tracing::info!(trigger = ?issued.trigger, "Google sign-in completed");

    let target = safe_callback_url(
        jar.get(OAUTH_CALLBACK_COOKIE).map(|c| c.value()),
        state.auth().base_url(),
    );
    Ok(signed_in(&state, clear_oauth_cookies(jar), &issued, &target))
}
