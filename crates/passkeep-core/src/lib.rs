//! Core library for passkeep.
//!
//! This crate owns everything below the terminal UI:
//!
//! - `api`: the GraphQL vault client and failure classification
//! - `auth`: the persisted session (sealed at rest) and keychain storage
//! - `models`: credential entry types shared across the client
//! - `vault`: the in-memory credential collection
//!
//! The session store is the single source of truth for the signed-in
//! state: the client re-reads it before every authenticated request, and
//! interested components subscribe to its changes instead of polling.

pub mod api;
pub mod auth;
pub mod models;
pub mod vault;

pub use api::{FailureClass, VaultClient, VaultError};
pub use auth::{CredentialStore, SessionData, SessionStore};
pub use models::{CredentialEntry, CredentialUpdate};
pub use vault::CredentialCollection;
