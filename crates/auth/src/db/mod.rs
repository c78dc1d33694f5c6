//! Database access for the auth service.
//!
//! # Database: `vieux_carre`
//!
//! ## Tables
//!
//! - `users` - Identities (credential and OAuth accounts)
//! - `bags` - Shopping bags; guest bags have a `NULL` owner
//!
//! The callbacks only talk to the [`UserRepository`] and [`BagRepository`]
//! traits, so tests can swap in an in-memory store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/auth/migrations/` and run via:
//! ```bash
//! cargo run -p vieux-carre-cli -- migrate
//! ```

pub mod bags;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use vieux_carre_core::{BagId, Email, UserId};

use crate::models::{Bag, NewUser, UserRecord};

pub use bags::PgBagRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`RepositoryError::Conflict`].
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(what.to_string());
        }
        Self::Database(err)
    }
}

/// Storage for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by (normalised) email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError>;

    /// Create a user. The store issues the ID.
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Overwrite a user's display name.
    async fn update_name(&self, id: UserId, name: &str) -> Result<(), RepositoryError>;
}

/// Storage for shopping bags.
#[async_trait]
pub trait BagRepository: Send + Sync {
    /// Find a bag by ID.
    async fn find_by_id(&self, id: BagId) -> Result<Option<Bag>, RepositoryError>;

    /// Delete every bag owned by `user_id`, then give bag `id` to that user.
    ///
    /// The reassignment only applies while the bag is still unowned. Returns
    /// `false` when another request claimed it first.
    async fn claim(&self, id: BagId, user_id: UserId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
