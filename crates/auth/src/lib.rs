//! Vieux Carré authentication service library.
//!
//! Credential and Google sign-in, signed session cookies, guest bag
//! migration and route protection for the storefront. The binary in
//! `main.rs` wires this library to `PostgreSQL`; tests wire it to in-memory
//! repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod callbacks;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod providers;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod state;
pub mod token;

pub use runtime::AuthRuntime;
pub use state::AppState;
