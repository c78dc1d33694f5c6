//! Domain models for the auth service.
//!
//! - [`user`] - Persisted user records
//! - [`bag`] - Shopping bags that can be claimed at sign-in
//! - [`session`] - Session token claims and the outward-facing session

pub mod bag;
pub mod session;
pub mod user;

pub use bag::Bag;
pub use session::{Session, SessionPatch, SessionToken, SessionUser};
pub use user::{NewUser, UserRecord};
