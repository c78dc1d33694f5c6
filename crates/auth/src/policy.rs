//! Session and cookie policy.
//!
//! Static values derived once from [`AuthConfig`]: the token lifetime, the
//! session cookie name and attributes, and the sign-in/error pages.
//!
//! | Environment | Cookie name | Domain | Secure |
//! |---|---|---|---|
//! | production | `__Secure-vc.session-token` | `.vieuxcarre.app` | yes |
//! | other | `vc.session-token` | host-only | no |

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::{AuthConfig, Environment};

/// Session cookie name outside production.
pub const SESSION_COOKIE_NAME: &str = "vc.session-token";

/// Session cookie name in production. The `__Secure-` prefix makes browsers
/// refuse the cookie over plain HTTP.
pub const SECURE_SESSION_COOKIE_NAME: &str = "__Secure-vc.session-token";

/// Cookie carrying the guest bag identifier.
pub const GUEST_BAG_COOKIE_NAME: &str = "sessionBagId";

/// Session token lifetime in seconds (24 hours).
pub const SESSION_MAX_AGE_SECONDS: i64 = 24 * 60 * 60;

/// Guest bag cookie lifetime in seconds (30 days).
pub const GUEST_BAG_MAX_AGE_SECONDS: i64 = 30 * 24 * 60 * 60;

/// How sessions are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStrategy {
    /// Signed, stateless token carried in a cookie.
    Jwt,
}

/// Session lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub strategy: SessionStrategy,
    /// Token lifetime in seconds.
    pub max_age: i64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            strategy: SessionStrategy::Jwt,
            max_age: SESSION_MAX_AGE_SECONDS,
        }
    }
}

/// Attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: &'static str,
    pub domain: Option<String>,
    pub path: &'static str,
    pub same_site: SameSite,
    pub http_only: bool,
    pub secure: bool,
}

impl CookiePolicy {
    /// Build the cookie policy for a deployment environment.
    ///
    /// `production_domain` is only applied in production; elsewhere the
    /// cookie is host-only so it works on `localhost`.
    #[must_use]
    pub fn for_environment(environment: Environment, production_domain: &str) -> Self {
        let production = environment.is_production();
        Self {
            name: if production {
                SECURE_SESSION_COOKIE_NAME
            } else {
                SESSION_COOKIE_NAME
            },
            domain: production.then(|| production_domain.to_string()),
            path: "/",
            same_site: SameSite::Lax,
            http_only: true,
            secure: production,
        }
    }

    /// Build the session cookie carrying `token`.
    #[must_use]
    pub fn session_cookie(&self, token: String, max_age: i64) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name, token))
            .path(self.path)
            .same_site(self.same_site)
            .http_only(self.http_only)
            .secure(self.secure)
            .max_age(time::Duration::seconds(max_age))
            .build();
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Build the cookie used to remove the session cookie.
    ///
    /// Path and domain must match the issued cookie or the browser keeps it.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name, ""))
            .path(self.path)
            .build();
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Build a fresh guest bag cookie.
    #[must_use]
    pub fn guest_bag_cookie(&self, bag_id: String) -> Cookie<'static> {
        Cookie::build((GUEST_BAG_COOKIE_NAME, bag_id))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .max_age(time::Duration::seconds(GUEST_BAG_MAX_AGE_SECONDS))
            .build()
    }
}

/// Pages the HTTP layer redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pages {
    pub sign_in: &'static str,
    pub error: &'static str,
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            sign_in: "/sign-in",
            error: "/sign-in",
        }
    }
}

/// The complete session/cookie policy handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub session: SessionPolicy,
    pub cookie: CookiePolicy,
    pub pages: Pages,
}

impl Policy {
    /// Derive the policy from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            session: SessionPolicy::default(),
            cookie: CookiePolicy::for_environment(config.environment, &config.cookie_domain),
            pages: Pages::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_cookie_policy() {
        let policy = CookiePolicy::for_environment(Environment::Production, ".vieuxcarre.app");
        assert_eq!(policy.name, "__Secure-vc.session-token");
        assert_eq!(policy.domain.as_deref(), Some(".vieuxcarre.app"));
        assert!(policy.secure);
        assert!(policy.http_only);
        assert_eq!(policy.same_site, SameSite::Lax);
    }

    #[test]
    fn test_development_cookie_policy() {
        let policy = CookiePolicy::for_environment(Environment::Development, ".vieuxcarre.app");
        assert_eq!(policy.name, "vc.session-token");
        assert_eq!(policy.domain, None);
        assert!(!policy.secure);
        assert_eq!(policy.path, "/");
    }

    #[test]
    fn test_session_policy_is_one_day() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.strategy, SessionStrategy::Jwt);
        assert_eq!(policy.max_age, 86_400);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let policy = CookiePolicy::for_environment(Environment::Production, ".vieuxcarre.app");
        let cookie = policy.session_cookie("token-value".to_string(), SESSION_MAX_AGE_SECONDS);
        assert_eq!(cookie.name(), "__Secure-vc.session-token");
        assert_eq!(cookie.value(), "token-value");
        assert!(matches!(
            cookie.domain(),
            Some(d) if d.trim_start_matches('.') == "vieuxcarre.app"
        ));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_MAX_AGE_SECONDS))
        );
    }

    #[test]
    fn test_pages_point_at_sign_in() {
        let pages = Pages::default();
        assert_eq!(pages.sign_in, "/sign-in");
        assert_eq!(pages.error, "/sign-in");
    }
}
