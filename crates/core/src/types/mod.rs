//! Core types for Vieux Carré.
//!
//! This module provides type-safe wrappers for identity concepts.

pub mod email;
pub mod id;
pub mod name;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{PLACEHOLDER_NAME, display_name_from_email, is_placeholder_name};
pub use role::{RoleError, UserRole};
