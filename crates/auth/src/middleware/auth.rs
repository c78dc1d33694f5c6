//! Session extractors.
//!
//! Both extractors decode the signed session cookie without a database
//! round-trip; the claims are trusted until the token expires.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::Session;
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(session): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", session.user.name.unwrap_or_default())
/// }
/// ```
pub struct RequireAuth(pub Session);

/// Rejection returned when a session is required but missing.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the sign-in page (for page requests).
    RedirectToSignIn(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn(location) => Redirect::to(&location).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_headers(state, &parts.headers)
            .map(Self)
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/api/") {
                    AuthRejection::Unauthorized
                } else {
                    let callback = parts
                        .uri
                        .path_and_query()
                        .map_or("/", |pq| pq.as_str());
                    AuthRejection::RedirectToSignIn(sign_in_location(state, callback))
                }
            })
    }
}

/// Extractor that optionally gets the current session.
pub struct OptionalAuth(pub Option<Session>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_from_headers(state, &parts.headers)))
    }
}

/// Decode the session cookie carried by `headers`.
#[must_use]
pub fn session_from_headers(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(state.auth().policy().cookie.name)?;
    state.auth().decode_session(cookie.value())
}

/// Sign-in page URL that returns to `callback_url` afterwards.
#[must_use]
pub fn sign_in_location(state: &AppState, callback_url: &str) -> String {
    format!(
        "{}?callbackUrl={}",
        state.auth().policy().pages.sign_in,
        urlencoding::encode(callback_url)
    )
}
