//! Vieux Carré Core - Shared identity types.
//!
//! This crate provides the types shared by the authentication service and the
//! command-line tools:
//! - `auth` - Sign-in providers, session tokens and callbacks
//! - `cli` - Migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Postgres encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, roles and display names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
