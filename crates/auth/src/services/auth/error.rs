//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::providers::OAuthError;
use crate::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vieux_carre_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords don't match")]
    PasswordMismatch,

    /// Provider is not registered.
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// OAuth state cookie missing or mismatched.
    #[error("invalid OAuth state")]
    InvalidOAuthState,

    /// OAuth exchange failed.
    #[error("oauth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Session token could not be produced.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
