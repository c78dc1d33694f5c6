//! Route protection.

use vieux_carre_core::UserRole;

use super::CallbackHook;
use crate::models::Session;

/// Path prefixes that need a signed-in user.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/shipping-address",
    "/payment-method",
    "/place-order",
    "/profile",
    "/user/",
    "/order/",
    "/admin",
];

/// Prefix that additionally needs the admin role.
pub const ADMIN_PREFIX: &str = "/admin";

/// A request as seen by the `authorized` hooks.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedRequest<'a> {
    pub path: &'a str,
    pub session: Option<&'a Session>,
}

/// Verdict of the `authorized` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allow,
    /// Send the browser to the sign-in page.
    RedirectToSignIn,
    /// Signed in, but not allowed.
    Forbidden,
}

/// Requires a session on the storefront's account and checkout pages.
#[derive(Debug, Clone)]
pub struct ProtectedRoutes {
    prefixes: Vec<String>,
}

impl Default for ProtectedRoutes {
    fn default() -> Self {
        Self {
            prefixes: PROTECTED_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl ProtectedRoutes {
    /// Protect a custom set of prefixes.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

impl CallbackHook for ProtectedRoutes {
    fn name(&self) -> &'static str {
        "protected_routes"
    }

    fn authorized(&self, request: &AuthorizedRequest<'_>) -> Option<Authorization> {
        if !self.is_protected(request.path) {
            return None;
        }

        let Some(session) = request.session.filter(|s| s.user.id.is_some()) else {
            return Some(Authorization::RedirectToSignIn);
        };

        if request.path.starts_with(ADMIN_PREFIX) && session.user.role != Some(UserRole::Admin) {
            return Some(Authorization::Forbidden);
        }
        Some(Authorization::Allow)
    }
}
