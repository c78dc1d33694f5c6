//! Session and credential route handlers.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::models::{Session, SessionPatch};
use crate::policy::GUEST_BAG_COOKIE_NAME;
use crate::providers::{Credentials, ProviderInfo};
use crate::runtime::IssuedToken;
use crate::services::auth::SignUpForm;
use crate::state::AppState;

/// Error code appended to the sign-in page after a rejected password.
pub const CREDENTIALS_SIGNIN_ERROR: &str = "CredentialsSignin";

/// Sign-in form data. Fields are optional so a malformed post is treated as
/// a failed sign-in rather than a 422.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl CredentialsForm {
    fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            email: self.email.clone()?,
            password: self.password.clone()?,
        })
    }
}

/// `GET /api/auth/providers`
pub async fn providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    Json(state.auth().providers())
}

/// `POST /api/auth/callback/credentials`
///
/// Redirects to `callbackUrl` with a session cookie, or back to the sign-in
/// page with `error=CredentialsSignin`.
pub async fn credentials_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    let guest_bag = jar.get(GUEST_BAG_COOKIE_NAME).map(|c| c.value().to_string());
    let credentials = form.credentials();

    let issued = state
        .auth()
        .sign_in_with_credentials(credentials.as_ref(), guest_bag.as_deref())
        .await?;

    let Some(issued) = issued else {
        let location = format!(
            "{}?error={CREDENTIALS_SIGNIN_ERROR}",
            state.auth().policy().pages.error
        );
        return Ok(Redirect::to(&location).into_response());
    };

    let target = safe_callback_url(form.callback_url.as_deref(), state.auth().base_url());
    Ok(signed_in(&state, jar, &issued, &target))
}

/// `POST /api/auth/signup`
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> Result<Response> {
    let guest_bag = jar.get(GUEST_BAG_COOKIE_NAME).map(|c| c.value().to_string());
    let issued = state.auth().sign_up(&form, guest_bag.as_deref()).await?;

    let target = safe_callback_url(form.callback_url.as_deref(), state.auth().base_url());
    Ok(signed_in(&state, jar, &issued, &target))
}

/// `GET /api/auth/session`
///
/// Returns the session as JSON, or `null`. A valid session is re-signed so
/// its expiry slides forward.
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Option<Session>>)> {
    let cookie_name = state.auth().policy().cookie.name;
    let Some(raw) = jar.get(cookie_name).map(|c| c.value().to_string()) else {
        return Ok((jar, Json(None)));
    };

    match state.auth().current_session(&raw).await? {
        Some(active) => {
            let jar = jar.add(state.auth().session_cookie(&active.token));
            Ok((jar, Json(Some(active.session))))
        }
        None => Ok((jar.remove(state.auth().removal_cookie()), Json(None))),
    }
}

/// `POST /api/auth/session`
///
/// Applies a `{ "name": ... }` patch with the `update` trigger.
pub async fn update_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(patch): Json<SessionPatch>,
) -> Result<(CookieJar, Json<Option<Session>>)> {
    let cookie_name = state.auth().policy().cookie.name;
    let Some(raw) = jar.get(cookie_name).map(|c| c.value().to_string()) else {
        return Ok((jar, Json(None)));
    };

    match state.auth().update_session(&raw, &patch).await? {
        Some(active) => {
            let jar = jar.add(state.auth().session_cookie(&active.token));
            Ok((jar, Json(Some(active.session))))
        }
        None => Ok((jar.remove(state.auth().removal_cookie()), Json(None))),
    }
}

/// `POST /api/auth/signout`
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    clear_sentry_user();
    (jar.remove(state.auth().removal_cookie()), Redirect::to("/"))
}

/// Set the session cookie and redirect.
pub(super) fn signed_in(
    state: &AppState,
    jar: CookieJar,
    issued: &IssuedToken,
    target: &str,
) -> Response {
    if let Some(user_id) = issued.claims.sub {
        set_sentry_user(&user_id, issued.claims.email.as_ref().map(|e| e.as_str()));
    }
    let jar = jar.add(state.auth().session_cookie(issued));
    (jar, Redirect::to(target)).into_response()
}

/// Keep redirects on our own site.
///
/// The value is resolved against `base_url` and only kept when the result
/// has the same origin. Whitespace and control characters are rejected
/// outright since browsers strip them before resolving. Anything else falls
/// back to `/`.
#[must_use]
pub fn safe_callback_url(raw: Option<&str>, base_url: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "/".to_string();
    };
    if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return "/".to_string();
    }
    let Ok(base) = url::Url::parse(base_url) else {
        return "/".to_string();
    };

    match base.join(raw) {
        Ok(target) if target.origin() == base.origin() => {
            let mut path = target.path().to_string();
            if let Some(query) = target.query() {
                path.push('?');
                path.push_str(query);
            }
            path
        }
        _ => "/".to_string(),
    }
}
