//! The auth runtime: providers, policy, callbacks and token codec wired
//! together from one [`AuthConfig`].
//!
//! Handlers never touch the callbacks directly. They call the operations
//! here, which run `authorize` -> `jwt` -> `session` in order and hand back
//! a signed token ready to be set as the session cookie.

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use chrono::Utc;

use crate::callbacks::{
    Authorization, AuthorizedRequest, CallbackHook, Callbacks, JwtContext, SessionContext, Trigger,
};
use crate::config::AuthConfig;
use crate::db::{BagRepository, RepositoryError, UserRepository};
use crate::models::{Session, SessionPatch, SessionToken, UserRecord};
use crate::policy::Policy;
use crate::providers::{
    Credentials, CredentialsProvider, GoogleProvider, Identity, ProviderInfo, Providers,
};
use crate::services::auth::{AuthError, SignUpForm, prepare_sign_up};
use crate::token::TokenCodec;

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub claims: SessionToken,
    pub encoded: String,
    /// Trigger the token was issued for; `None` for plain refreshes.
    pub trigger: Option<Trigger>,
}

/// A live session together with its re-signed token.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session: Session,
    pub token: IssuedToken,
}

/// Shared authentication runtime.
pub struct AuthRuntime {
    policy: Policy,
    base_url: String,
    users: Arc<dyn UserRepository>,
    providers: Providers,
    callbacks: Callbacks,
    codec: TokenCodec,
}

impl AuthRuntime {
    /// Build the runtime with the built-in callbacks and no overrides.
    #[must_use]
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserRepository>,
        bags: Arc<dyn BagRepository>,
    ) -> Self {
        let policy = Policy::from_config(config);
        let providers = Providers {
            google: config
                .google
                .as_ref()
                .map(|google| GoogleProvider::new(google, &config.base_url)),
            credentials: CredentialsProvider::new(Arc::clone(&users)),
        };
        let callbacks = Callbacks::new(Arc::clone(&users), bags, policy.session.max_age);

        Self {
            policy,
            base_url: config.base_url.clone(),
            users,
            providers,
            callbacks,
            codec: TokenCodec::new(&config.secret),
        }
    }

    /// Register a callback override. Overrides run in registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn CallbackHook>) -> Self {
        self.callbacks = self.callbacks.with_hook(hook);
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Google provider, if configured.
    #[must_use]
    pub const fn google(&self) -> Option<&GoogleProvider> {
        self.providers.google.as_ref()
    }

    /// Public list of registered providers.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.providers.list(&self.base_url, self.policy.pages.sign_in)
    }

    /// Sign in with email and password.
    ///
    /// Returns `Ok(None)` when the credentials are rejected.
    ///
    /// # Errors
    ///
    /// Storage or signing failures after a successful `authorize`.
    pub async fn sign_in_with_credentials(
        &self,
        credentials: Option<&Credentials>,
        guest_bag_id: Option<&str>,
    ) -> Result<Option<IssuedToken>, AuthError> {
        let Some(identity) = self.providers.credentials.authorize(credentials).await else {
            return Ok(None);
        };
        self.issue(&identity, Trigger::SignIn, guest_bag_id)
            .await
            .map(Some)
    }

    /// Create a credential account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`prepare_sign_up`],
    /// `AuthError::UserAlreadyExists` if the email is taken, and storage or
    /// signing failures.
    pub async fn sign_up(
        &self,
        form: &SignUpForm,
        guest_bag_id: Option<&str>,
    ) -> Result<IssuedToken, AuthError> {
        let new_user = prepare_sign_up(form)?;
        let user = self.users.create(new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;
        tracing::info!(user_id = %user.id, "credential account created");

        self.issue(&identity_for(&user), Trigger::SignUp, guest_bag_id)
            .await
    }

    /// Sign in with an identity established by an OAuth provider.
    ///
    /// The trigger is `SignUp` when no account exists yet for the email.
    ///
    /// # Errors
    ///
    /// Storage or signing failures.
    pub async fn sign_in_with_oauth(
        &self,
        identity: &Identity,
        guest_bag_id: Option<&str>,
    ) -> Result<IssuedToken, AuthError> {
        let trigger = if self.users.find_by_email(&identity.email).await?.is_some() {
            Trigger::SignIn
        } else {
            Trigger::SignUp
        };
        self.issue(identity, trigger, guest_bag_id).await
    }

    /// Resolve the session carried by a cookie value and re-sign its token.
    ///
    /// Returns `Ok(None)` for invalid or expired tokens and for tokens whose
    /// user no longer exists.
    ///
    /// # Errors
    ///
    /// Storage or signing failures.
    pub async fn current_session(
        &self,
        raw_token: &str,
    ) -> Result<Option<ActiveSession>, AuthError> {
        let Ok(token) = self.codec.decode(raw_token) else {
            return Ok(None);
        };
        self.refresh(token, None, None).await
    }

    /// Apply a client-initiated patch to the session.
    ///
    /// The patched name is stored on the user so later refreshes keep it.
    ///
    /// # Errors
    ///
    /// Storage or signing failures.
    pub async fn update_session(
        &self,
        raw_token: &str,
        patch: &SessionPatch,
    ) -> Result<Option<ActiveSession>, AuthError> {
        let Ok(token) = self.codec.decode(raw_token) else {
            return Ok(None);
        };

        if let (Some(name), Some(user_id)) = (patch.name(), token.sub) {
            match self.users.update_name(user_id, name).await {
                Ok(()) => {}
                Err(RepositoryError::NotFound) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }

        self.refresh(token, Some(Trigger::Update), Some(patch)).await
    }

    /// Decode a cookie value into a session without touching storage.
    ///
    /// Used by extractors and route protection, where the signed claims are
    /// trusted until the token expires.
    #[must_use]
    pub fn decode_session(&self, raw_token: &str) -> Option<Session> {
        let token = self.codec.decode(raw_token).ok()?;
        token.sub?;
        Some(self.callbacks.session(SessionContext {
            token: &token,
            trigger: None,
            patch: None,
        }))
    }

    /// Run the `authorized` hooks for a request path.
    #[must_use]
    pub fn authorize_request(&self, path: &str, session: Option<&Session>) -> Authorization {
        self.callbacks
            .authorized(&AuthorizedRequest { path, session })
    }

    /// Cookie carrying `token`.
    #[must_use]
    pub fn session_cookie(&self, token: &IssuedToken) -> Cookie<'static> {
        self.policy
            .cookie
            .session_cookie(token.encoded.clone(), self.policy.session.max_age)
    }

    /// Cookie that removes the session cookie.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.policy.cookie.removal_cookie()
    }

    async fn issue(
        &self,
        identity: &Identity,
        trigger: Trigger,
        guest_bag_id: Option<&str>,
    ) -> Result<IssuedToken, AuthError> {
        let token = SessionToken::issued_at(Utc::now(), self.policy.session.max_age);
        let ctx = JwtContext {
            identity: Some(identity),
            trigger: Some(trigger),
            patch: None,
            guest_bag_id,
        };
        let claims = self
            .callbacks
            .jwt(token, ctx)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let encoded = self.codec.encode(&claims)?;

        Ok(IssuedToken {
            claims,
            encoded,
            trigger: Some(trigger),
        })
    }

    async fn refresh(
        &self,
        token: SessionToken,
        trigger: Option<Trigger>,
        patch: Option<&SessionPatch>,
    ) -> Result<Option<ActiveSession>, AuthError> {
        let ctx = JwtContext {
            identity: None,
            trigger,
            patch,
            guest_bag_id: None,
        };
        let Some(claims) = self.callbacks.jwt(token, ctx).await? else {
            return Ok(None);
        };

        let session = self.callbacks.session(SessionContext {
            token: &claims,
            trigger,
            patch,
        });
        let encoded = self.codec.encode(&claims)?;

        Ok(Some(ActiveSession {
            session,
            token: IssuedToken {
                claims,
                encoded,
                trigger,
            },
        }))
    }
}

impl std::fmt::Debug for AuthRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRuntime")
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .field("hooks", &self.callbacks.hook_names())
            .finish_non_exhaustive()
    }
}

fn identity_for(user: &UserRecord) -> Identity {
    Identity {
        id: Some(user.id.to_string()),
        name: Some(user.name.clone()),
        email: user.email.clone(),
        image: user.image.clone(),
        role: Some(user.role),
    }
}
