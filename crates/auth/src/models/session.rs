//! Session-related types.
//!
//! [`SessionToken`] is the signed claim set stored in the session cookie.
//! [`Session`] is what `GET /api/auth/session` hands back to the browser.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use vieux_carre_core::{Email, UserId, UserRole};

/// Claims carried by the session token.
///
/// Every field except the timestamps is optional because the token is built
/// up by the `jwt` callback chain; a token without `sub` is not a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Subject: the user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

impl SessionToken {
    /// Start a token issued now and valid for `max_age` seconds.
    #[must_use]
    pub fn issued_at(now: DateTime<Utc>, max_age: i64) -> Self {
        let iat = now.timestamp();
        Self {
            iat,
            exp: iat + max_age,
            ..Self::default()
        }
    }

    /// Move the expiry forward, as done each time the token is re-issued.
    pub fn refresh(&mut self, now: DateTime<Utc>, max_age: i64) {
        self.iat = now.timestamp();
        self.exp = self.iat + max_age;
    }

    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// The user portion of an outward-facing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<UserId>,
    pub role: Option<UserRole>,
    pub name: Option<String>,
    pub email: Option<Email>,
    pub image: Option<String>,
}

/// Session returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

impl Session {
    /// An empty session expiring with `token`.
    #[must_use]
    pub fn for_token(token: &SessionToken) -> Self {
        Self {
            user: SessionUser::default(),
            expires: token.expires_at(),
        }
    }
}

/// Client-supplied patch sent with an `update` trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionPatch {
    /// The patched name, ignoring blank values.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_at_sets_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = SessionToken::issued_at(now, 86_400);
        assert_eq!(token.iat, 1_700_000_000);
        assert_eq!(token.exp, 1_700_086_400);
        assert_eq!(token.expires_at().timestamp(), 1_700_086_400);
    }

    #[test]
    fn test_token_omits_empty_claims() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let json = serde_json::to_value(SessionToken::issued_at(now, 60)).unwrap();
        assert_eq!(json, serde_json::json!({ "iat": 1_700_000_000, "exp": 1_700_000_060 }));
    }

    #[test]
    fn test_patch_name_ignores_blank() {
        let patch = SessionPatch {
            name: Some("   ".to_string()),
        };
        assert_eq!(patch.name(), None);

        let patch: SessionPatch = serde_json::from_str(r#"{"name":" Marie "}"#).unwrap();
        assert_eq!(patch.name(), Some("Marie"));
    }
}
