//! Authentication service helpers.
//!
//! Password hashing uses Argon2id. Verification goes through
//! `PasswordVerifier`, which compares digests in constant time.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use vieux_carre_core::{Email, UserRole, display_name_from_email};

use crate::models::NewUser;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Sign-up form data.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .finish_non_exhaustive()
    }
}

/// Validate a sign-up form and hash its password.
///
/// A blank name falls back to the email's local part.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword` or
/// `AuthError::PasswordMismatch` for invalid input, and
/// `AuthError::PasswordHash` if hashing fails.
pub fn prepare_sign_up(form: &SignUpForm) -> Result<NewUser, AuthError> {
    let email = Email::parse(&form.email)?;
    validate_password(&form.password)?;
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| display_name_from_email(&email), str::to_string);

    Ok(NewUser {
        name,
        password_hash: Some(hash_password(&form.password)?),
        email,
        role: UserRole::User,
        image: None,
    })
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
