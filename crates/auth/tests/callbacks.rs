//! `jwt` and `session` callback behaviour through the runtime.

#![allow(clippy::unwrap_used)]

mod common;

use common::{TestAuth, seed_credential_user};
use vieux_carre_auth::callbacks::{CallbackHook, JwtContext, SessionContext, Trigger};
use vieux_carre_auth::models::{Session, SessionPatch, SessionToken};
use vieux_carre_auth::providers::{Credentials, Identity};
use vieux_carre_core::{Email, UserRole};

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn google_identity(email: &str, name: Option<&str>) -> Identity {
    Identity {
        id: Some("google-sub-1089".to_string()),
        name: name.map(str::to_string),
        email: Email::parse(email).unwrap(),
        image: Some("https://lh3.googleusercontent.com/a/photo".to_string()),
        role: None,
    }
}

#[tokio::test]
async fn test_placeholder_name_is_replaced_once() {
    let auth = TestAuth::new();
    let user = seed_credential_user(
        &auth.users,
        "marie.laveau@vieuxcarre.app",
        "NO_NAME",
        "gris-gris-1",
        UserRole::User,
    );
    let creds = credentials("marie.laveau@vieuxcarre.app", "gris-gris-1");

    let first = auth
        .runtime
        .sign_in_with_credentials(Some(&creds), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.claims.name.as_deref(), Some("marie.laveau"));
    assert_eq!(auth.users.get(user.id).unwrap().name, "marie.laveau");

    auth.runtime
        .sign_in_with_credentials(Some(&creds), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        auth.users.name_updates(),
        vec![(user.id, "marie.laveau".to_string())]
    );
}

#[tokio::test]
async fn test_sign_in_claims_guest_bag() {
    let auth = TestAuth::new();
    let user = seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );
    auth.bags.insert_bag(Some(user.id));
    auth.bags.insert_bag(Some(user.id));
    let guest = auth.bags.insert_bag(None);
    let guest_cookie = guest.id.to_string();

    auth.runtime
        .sign_in_with_credentials(
            Some(&credentials("buyer@vieuxcarre.app", "cafe-au-lait")),
            Some(&guest_cookie),
        )
        .await
        .unwrap()
        .unwrap();

    let owned = auth.bags.bags_for_user(user.id);
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, guest.id);
}

#[tokio::test]
async fn test_sign_up_claims_guest_bag() {
    let auth = TestAuth::new();
    let guest = auth.bags.insert_bag(None);
    let guest_cookie = guest.id.to_string();

    let issued = auth
        .runtime
        .sign_in_with_oauth(
            &google_identity("new@gmail.com", Some("New Buyer")),
            Some(&guest_cookie),
        )
        .await
        .unwrap();
    assert_eq!(issued.trigger, Some(Trigger::SignUp));

    let user_id = issued.claims.sub.unwrap();
    let owned = auth.bags.bags_for_user(user_id);
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, guest.id);
}

#[tokio::test]
async fn test_owned_bag_is_not_taken() {
    let auth = TestAuth::new();
    let other = seed_credential_user(
        &auth.users,
        "other@vieuxcarre.app",
        "Other",
        "chicory-1",
        UserRole::User,
    );
    let user = seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );
    let mine = auth.bags.insert_bag(Some(user.id));
    let theirs = auth.bags.insert_bag(Some(other.id));
    let cookie = theirs.id.to_string();

    auth.runtime
        .sign_in_with_credentials(
            Some(&credentials("buyer@vieuxcarre.app", "cafe-au-lait")),
            Some(&cookie),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(auth.bags.get(theirs.id).unwrap().user_id, Some(other.id));
    assert_eq!(auth.bags.bags_for_user(user.id)[0].id, mine.id);
}

#[tokio::test]
async fn test_unknown_or_malformed_guest_bag_is_ignored() {
    let auth = TestAuth::new();
    let user = seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );
    let mine = auth.bags.insert_bag(Some(user.id));
    let creds = credentials("buyer@vieuxcarre.app", "cafe-au-lait");

    for cookie in ["not-a-uuid", "", "6f1c1f2e-8a7b-4a43-9c1e-2b4f0f6c9d11"] {
        auth.runtime
            .sign_in_with_credentials(Some(&creds), Some(cookie))
            .await
            .unwrap()
            .unwrap();
    }

    let owned = auth.bags.bags_for_user(user.id);
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, mine.id);
}

#[tokio::test]
async fn test_oauth_creates_then_signs_in() {
    let auth = TestAuth::new();
    let identity = google_identity("new.buyer@gmail.com", None);

    let first = auth.runtime.sign_in_with_oauth(&identity, None).await.unwrap();
    assert_eq!(first.trigger, Some(Trigger::SignUp));
    let user = auth.users.get(first.claims.sub.unwrap()).unwrap();
    assert_eq!(user.name, "new.buyer");
    assert_eq!(user.role, UserRole::User);
    assert!(user.password_hash.is_none());
    assert_eq!(first.claims.picture, identity.image);

    let second = auth.runtime.sign_in_with_oauth(&identity, None).await.unwrap();
    assert_eq!(second.trigger, Some(Trigger::SignIn));
    assert_eq!(second.claims.sub, first.claims.sub);
    assert_eq!(auth.users.count(), 1);
}

#[tokio::test]
async fn test_update_trigger_patches_name() {
    let auth = TestAuth::new();
    let user = seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );
    let issued = auth
        .runtime
        .sign_in_with_credentials(Some(&credentials("buyer@vieuxcarre.app", "cafe-au-lait")), None)
        .await
        .unwrap()
        .unwrap();

    let patch = SessionPatch {
        name: Some("Madame Buyer".to_string()),
    };
    let active = auth
        .runtime
        .update_session(&issued.encoded, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(active.session.user.name.as_deref(), Some("Madame Buyer"));
    assert_eq!(active.token.claims.name.as_deref(), Some("Madame Buyer"));
    assert_eq!(auth.users.get(user.id).unwrap().name, "Madame Buyer");

    let refreshed = auth
        .runtime
        .current_session(&active.token.encoded)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.session.user.name.as_deref(), Some("Madame Buyer"));
}

#[tokio::test]
async fn test_refresh_follows_stored_user() {
    let auth = TestAuth::new();
    let user = seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );
    let issued = auth
        .runtime
        .sign_in_with_credentials(Some(&credentials("buyer@vieuxcarre.app", "cafe-au-lait")), None)
        .await
        .unwrap()
        .unwrap();

    auth.users.set_role(user.id, UserRole::Admin);
    let active = auth.runtime.current_session(&issued.encoded).await.unwrap().unwrap();
    assert_eq!(active.session.user.role, Some(UserRole::Admin));

    auth.users.remove(user.id);
    assert!(auth.runtime.current_session(&issued.encoded).await.unwrap().is_none());
}

#[tokio::test]
async fn test_tampered_token_has_no_session() {
    let auth = TestAuth::new();
    assert!(auth.runtime.current_session("garbage").await.unwrap().is_none());
    assert!(auth.runtime.decode_session("garbage").is_none());
}

struct FixedName(&'static str);

impl CallbackHook for FixedName {
    fn name(&self) -> &'static str {
        self.0
    }

    fn jwt(&self, token: &mut SessionToken, _ctx: &JwtContext<'_>) {
        token.name = Some(self.0.to_string());
    }

    fn session(&self, session: &mut Session, _ctx: &SessionContext<'_>) {
        session.user.image = Some(format!("/avatars/{}.png", self.0));
    }
}

#[tokio::test]
async fn test_overrides_run_in_registration_order() {
    let mut auth = TestAuth::new();
    auth.runtime = auth
        .runtime
        .with_hook(Box::new(FixedName("first")))
        .with_hook(Box::new(FixedName("second")));
    assert_eq!(auth.runtime.callbacks().hook_names(), vec!["first", "second"]);
    seed_credential_user(
        &auth.users,
        "buyer@vieuxcarre.app",
        "Buyer",
        "cafe-au-lait",
        UserRole::User,
    );

    let issued = auth
        .runtime
        .sign_in_with_credentials(Some(&credentials("buyer@vieuxcarre.app", "cafe-au-lait")), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(issued.claims.name.as_deref(), Some("second"));

    let session = auth.runtime.decode_session(&issued.encoded).unwrap();
    assert_eq!(session.user.image.as_deref(), Some("/avatars/second.png"));
}
