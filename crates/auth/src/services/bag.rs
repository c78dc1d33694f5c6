//! Guest bag migration.
//!
//! A browser shops anonymously with a bag referenced by the `sessionBagId`
//! cookie. When it signs in, that bag becomes the user's only bag.

use vieux_carre_core::{BagId, UserId};

use crate::db::{BagRepository, RepositoryError};

/// Outcome of a guest bag claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagClaim {
    /// No guest bag cookie, or its value is not a bag ID.
    NoGuestBag,
    /// The cookie points at a bag that does not exist.
    NotFound,
    /// The bag already belongs to a user and is left alone.
    AlreadyOwned,
    /// Another request claimed the bag between lookup and update.
    Lost,
    /// The bag now belongs to the user; their other bags were deleted.
    Claimed(BagId),
}

/// Hand the guest bag named by `cookie_value` to `user_id`.
///
/// # Errors
///
/// Returns `RepositoryError` if the lookup or the claim fails.
pub async fn claim_guest_bag(
    bags: &dyn BagRepository,
    cookie_value: Option<&str>,
    user_id: UserId,
) -> Result<BagClaim, RepositoryError> {
    let Some(raw) = cookie_value.filter(|v| !v.trim().is_empty()) else {
        return Ok(BagClaim::NoGuestBag);
    };
    let Ok(bag_id) = raw.parse::<BagId>() else {
        tracing::debug!(cookie = raw, "ignoring malformed guest bag cookie");
        return Ok(BagClaim::NoGuestBag);
    };

    let Some(bag) = bags.find_by_id(bag_id).await? else {
        return Ok(BagClaim::NotFound);
    };
    if !bag.is_guest() {
        return Ok(BagClaim::AlreadyOwned);
    }

    if bags.claim(bag_id, user_id).await? {
        tracing::info!(%user_id, %bag_id, "guest bag claimed");
        Ok(BagClaim::Claimed(bag_id))
    } else {
        tracing::warn!(%user_id, %bag_id, "guest bag claimed by a concurrent request");
        Ok(BagClaim::Lost)
    }
}
