//! Business logic services for the auth runtime.
//!
//! # Services
//!
//! - `auth` - Password hashing, verification and sign-up validation
//! - `bag` - Claiming a guest bag for a user at sign-in

pub mod auth;
pub mod bag;
