//! Callback chain run by the auth runtime.
//!
//! The built-in callbacks run first:
//! - [`jwt`] - resolves or creates the user, normalises placeholder names,
//!   claims the guest bag and applies `update` patches to the token
//! - [`session`] - copies token claims into the outward-facing session
//!
//! Then every registered [`CallbackHook`] runs, in registration order. A hook
//! registered later sees (and may overwrite) what earlier ones produced, so
//! field precedence is fixed by the order of [`Callbacks::with_hook`] calls.

pub mod authorized;
pub mod jwt;
pub mod session;

use std::sync::Arc;

use crate::db::{BagRepository, RepositoryError, UserRepository};
use crate::models::{Session, SessionPatch, SessionToken};
use crate::providers::Identity;

pub use authorized::{Authorization, AuthorizedRequest, ProtectedRoutes};

/// Event that caused the callbacks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Interactive sign-in of an existing account.
    SignIn,
    /// Interactive sign-in that created the account.
    SignUp,
    /// Client-initiated session update carrying a [`SessionPatch`].
    Update,
}

impl Trigger {
    /// Sign-in and sign-up are the triggers that claim guest bags.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::SignIn | Self::SignUp)
    }
}

/// Inputs to the `jwt` callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtContext<'a> {
    /// Present only when a provider just established an identity.
    pub identity: Option<&'a Identity>,
    pub trigger: Option<Trigger>,
    pub patch: Option<&'a SessionPatch>,
    /// Raw value of the guest bag cookie.
    pub guest_bag_id: Option<&'a str>,
}

/// Inputs to the `session` callback.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub token: &'a SessionToken,
    pub trigger: Option<Trigger>,
    pub patch: Option<&'a SessionPatch>,
}

/// An override applied after the built-in callbacks.
///
/// All methods default to "no change".
pub trait CallbackHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Adjust the token after the built-in `jwt` callback.
    fn jwt(&self, _token: &mut SessionToken, _ctx: &JwtContext<'_>) {}

    /// Adjust the session after the built-in `session` callback.
    fn session(&self, _session: &mut Session, _ctx: &SessionContext<'_>) {}

    /// Decide whether a request may proceed. `None` abstains.
    fn authorized(&self, _request: &AuthorizedRequest<'_>) -> Option<Authorization> {
        None
    }
}

/// The callback chain.
pub struct Callbacks {
    users: Arc<dyn UserRepository>,
    bags: Arc<dyn BagRepository>,
    max_age: i64,
    hooks: Vec<Box<dyn CallbackHook>>,
}

impl Callbacks {
    /// Create the built-in chain with no overrides.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        bags: Arc<dyn BagRepository>,
        max_age: i64,
    ) -> Self {
        Self {
            users,
            bags,
            max_age,
            hooks: Vec::new(),
        }
    }

    /// Append an override. Later hooks take precedence.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn CallbackHook>) -> Self {
        tracing::debug!(
            hook = hook.name(),
            position = self.hooks.len(),
            "callback hook registered"
        );
        self.hooks.push(hook);
        self
    }

    /// Names of the registered overrides, in the order they run.
    #[must_use]
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Run the `jwt` chain.
    ///
    /// Returns `None` when the token no longer refers to an existing user.
    ///
    /// # Errors
    ///
    /// Storage failures propagate unchanged.
    pub async fn jwt(
        &self,
        token: SessionToken,
        ctx: JwtContext<'_>,
    ) -> Result<Option<SessionToken>, RepositoryError> {
        let Some(mut token) =
            jwt::enrich_token(self.users.as_ref(), self.bags.as_ref(), token, &ctx).await?
        else {
            return Ok(None);
        };

        for hook in &self.hooks {
            hook.jwt(&mut token, &ctx);
        }
        token.refresh(chrono::Utc::now(), self.max_age);
        Ok(Some(token))
    }

    /// Run the `session` chain.
    #[must_use]
    pub fn session(&self, ctx: SessionContext<'_>) -> Session {
        let mut session = session::materialize_session(&ctx);
        for hook in &self.hooks {
            hook.session(&mut session, &ctx);
        }
        session
    }

    /// Ask every hook about a request; the last non-abstaining answer wins.
    #[must_use]
    pub fn authorized(&self, request: &AuthorizedRequest<'_>) -> Authorization {
        self.hooks
            .iter()
            .filter_map(|hook| hook.authorized(request))
            .last()
            .unwrap_or(Authorization::Allow)
    }
}
