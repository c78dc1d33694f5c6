//! Built-in `jwt` callback.

use vieux_carre_core::{UserRole, display_name_from_email};

use super::{JwtContext, Trigger};
use crate::db::{BagRepository, RepositoryError, UserRepository};
use crate::models::{NewUser, SessionToken, UserRecord};
use crate::providers::Identity;
use crate::services::bag::claim_guest_bag;

/// Enrich `token` with the user it belongs to.
///
/// With an identity, the user is resolved (or created) and copied into the
/// token. Without one, the token's subject is re-read from the store so role
/// changes and deletions take effect; `None` means the user is gone.
pub(super) async fn enrich_token(
    users: &dyn UserRepository,
    bags: &dyn BagRepository,
    mut token: SessionToken,
    ctx: &JwtContext<'_>,
) -> Result<Option<SessionToken>, RepositoryError> {
    let user = match ctx.identity {
        Some(identity) => {
            let user = resolve_user(users, identity).await?;
            copy_user(&mut token, &user);
            if identity.image.is_some() {
                token.picture.clone_from(&identity.image);
            }
            user
        }
        None => {
            let Some(sub) = token.sub else {
                return Ok(None);
            };
            let Some(user) = users.find_by_id(sub).await? else {
                tracing::info!(user_id = %sub, "session refers to a deleted user");
                return Ok(None);
            };
            copy_user(&mut token, &user);
            user
        }
    };

    if let (Some(identity), Some(trigger)) = (ctx.identity, ctx.trigger)
        && trigger.is_interactive()
        && identity.id.is_some()
    {
        claim_guest_bag(bags, ctx.guest_bag_id, user.id).await?;
    }

    if ctx.trigger == Some(Trigger::Update)
        && let Some(name) = ctx.patch.and_then(|p| p.name())
    {
        token.name = Some(name.to_string());
    }

    Ok(Some(token))
}

async fn resolve_user(
    users: &dyn UserRepository,
    identity: &Identity,
) -> Result<UserRecord, RepositoryError> {
    let mut user = match users.find_by_email(&identity.email).await? {
        Some(user) => user,
        None => {
            let name = identity
                .name
                .clone()
                .unwrap_or_else(|| display_name_from_email(&identity.email));
            let user = users
                .create(NewUser {
                    name,
                    email: identity.email.clone(),
                    password_hash: None,
                    role: UserRole::User,
                    image: identity.image.clone(),
                })
                .await?;
            tracing::info!(user_id = %user.id, "user created on first sign-in");
            user
        }
    };

    if user.has_placeholder_name() {
        let name = display_name_from_email(&user.email);
        users.update_name(user.id, &name).await?;
        tracing::info!(user_id = %user.id, "placeholder name replaced");
        user.name = name;
    }

    Ok(user)
}

fn copy_user(token: &mut SessionToken, user: &UserRecord) {
    token.sub = Some(user.id);
    token.id = Some(user.id);
    token.role = Some(user.role);
    token.name = Some(user.name.clone());
    token.email = Some(user.email.clone());
    if user.image.is_some() {
        token.picture.clone_from(&user.image);
    }
}
