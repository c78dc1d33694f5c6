//! Shopping bag records.

use chrono::{DateTime, Utc};

use vieux_carre_core::{BagId, UserId};

/// A shopping bag.
///
/// Guest bags have no owner and are referenced by the `sessionBagId`
/// cookie until the browser signs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bag {
    pub id: BagId,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bag {
    /// Returns `true` if no user owns this bag yet.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}
