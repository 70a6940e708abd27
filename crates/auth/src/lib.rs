//! `mandra-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod client;
pub mod key;
pub mod scope;

pub use authorize::{require_scope, AuthzError};
pub use client::ClientIdentity;
pub use key::hash_api_key;
pub use scope::{parse_scopes, Scope};
