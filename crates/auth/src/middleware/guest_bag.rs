//! Guest bag cookie.
//!
//! Every browser gets a `sessionBagId` cookie on its first request so a bag
//! can be started before signing in. The value is only an identifier; the
//! bag row is created when the first item is added.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use vieux_carre_core::BagId;

use crate::policy::GUEST_BAG_COOKIE_NAME;
use crate::state::AppState;

/// Issue a guest bag cookie when the request has none.
pub async fn guest_bag_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if jar.get(GUEST_BAG_COOKIE_NAME).is_some() {
        return next.run(request).await;
    }

    let bag_id = BagId::generate();
    tracing::debug!(%bag_id, "issuing guest bag cookie");
    let cookie = state
        .auth()
        .policy()
        .cookie
        .guest_bag_cookie(bag_id.to_string());

    let response = next.run(request).await;
    (jar.add(cookie), response).into_response()
}
