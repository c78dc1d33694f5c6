//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use vieux_carre_core::{Email, UserId, UserRole, is_placeholder_name};

/// A persisted storefront user.
///
/// `password_hash` is `None` for accounts that only ever signed in through
/// an OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-issued user ID.
    pub id: UserId,
    /// Display name, possibly the `NO_NAME` placeholder.
    pub name: String,
    /// User's email address (unique).
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: Option<String>,
    /// User's role.
    pub role: UserRole,
    /// Avatar URL, usually supplied by an OAuth provider.
    pub image: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns `true` if the stored name is the placeholder sentinel.
    #[must_use]
    pub fn has_placeholder_name(&self) -> bool {
        is_placeholder_name(&self.name)
    }
}

/// Input for creating a user. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub image: Option<String>,
}
