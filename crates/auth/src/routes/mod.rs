//! HTTP route handlers for the auth service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Auth API (mounted at /api/auth)
//! GET  /providers                       - Registered providers
//! POST /callback/credentials            - Email/password sign-in (rate limited)
//! POST /signup                          - Create a credential account (rate limited)
//! GET  /signin/google                   - Redirect to Google
//! GET  /callback/google                 - Google OAuth callback
//! GET  /session                         - Current session or null
//! POST /session                         - Session update (name patch)
//! POST /signout                         - Clear the session cookie
//! ```

pub mod auth;
pub mod health;
pub mod oauth;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    authorized_middleware, credentials_rate_limiter, guest_bag_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Routes that accept passwords.
fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/callback/credentials", post(auth::credentials_callback))
        .route("/signup", post(auth::sign_up))
        .layer(credentials_rate_limiter())
}

/// Create the auth API router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/providers", get(auth::providers))
        .route("/session", get(auth::session).post(auth::update_session))
        .route("/signout", post(auth::sign_out))
        .route("/signin/google", get(oauth::sign_in))
        .route("/callback/google", get(oauth::callback))
        .merge(credential_routes())
}

/// Create the full application router with its middleware stack.
///
/// Sentry layers are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .layer(from_fn_with_state(state.clone(), authorized_middleware))
        .layer(from_fn_with_state(state.clone(), guest_bag_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
