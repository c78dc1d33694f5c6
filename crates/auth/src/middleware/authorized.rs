//! Route protection driven by the `authorized` callback hooks.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::{session_from_headers, sign_in_location};
use crate::callbacks::Authorization;
use crate::state::AppState;

/// Redirect or reject requests the registered hooks refuse.
pub async fn authorized_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let session = session_from_headers(&state, request.headers());
    let path = request.uri().path();

    match state.auth().authorize_request(path, session.as_ref()) {
        Authorization::Allow => next.run(request).await,
        Authorization::RedirectToSignIn => {
            let callback = request
                .uri()
                .path_and_query()
                .map_or(path, |pq| pq.as_str());
            tracing::debug!(path, "unauthenticated request to protected route");
            Redirect::to(&sign_in_location(&state, callback)).into_response()
        }
        Authorization::Forbidden => {
            tracing::warn!(path, "signed-in user lacks the role for this route");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
