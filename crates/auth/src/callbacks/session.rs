//! Built-in `session` callback.

use super::{SessionContext, Trigger};
use crate::models::{Session, SessionUser};

/// Build the outward-facing session from the token claims.
pub(super) fn materialize_session(ctx: &SessionContext<'_>) -> Session {
    let token = ctx.token;
    let mut session = Session::for_token(token);
    session.user = SessionUser {
        id: token.id.or(token.sub),
        role: token.role,
        name: token.name.clone(),
        email: token.email.clone(),
        image: token.picture.clone(),
    };

    if ctx.trigger == Some(Trigger::Update)
        && let Some(name) = ctx.patch.and_then(|p| p.name())
    {
        session.user.name = Some(name.to_string());
    }

    session
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vieux_carre_core::{Email, UserId, UserRole};

    use super::*;
    use crate::models::{SessionPatch, SessionToken};

    fn token() -> SessionToken {
        let id = UserId::generate();
        SessionToken {
            sub: Some(id),
            id: Some(id),
            role: Some(UserRole::Admin),
            name: Some("Marie".to_string()),
            email: Some(Email::parse("marie@vieuxcarre.app").unwrap()),
            picture: None,
            ..SessionToken::issued_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap(), 60)
        }
    }

    #[test]
    fn test_copies_claims() {
        let token = token();
        let session = materialize_session(&SessionContext {
            token: &token,
            trigger: None,
            patch: None,
        });
        assert_eq!(session.user.id, token.id);
        assert_eq!(session.user.role, Some(UserRole::Admin));
        assert_eq!(session.user.name.as_deref(), Some("Marie"));
        assert_eq!(session.expires.timestamp(), 1_700_000_060);
    }

    #[test]
    fn test_patch_only_applies_on_update() {
        let token = token();
        let patch = SessionPatch {
            name: Some("Marie Laveau".to_string()),
        };

        let session = materialize_session(&SessionContext {
            token: &token,
            trigger: Some(Trigger::SignIn),
            patch: Some(&patch),
        });
        assert_eq!(session.user.name.as_deref(), Some("Marie"));

        let session = materialize_session(&SessionContext {
            token: &token,
            trigger: Some(Trigger::Update),
            patch: Some(&patch),
        });
        assert_eq!(session.user.name.as_deref(), Some("Marie Laveau"));
    }
}
