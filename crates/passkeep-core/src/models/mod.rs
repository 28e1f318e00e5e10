//! Data models for vault entities.
//!
//! This module contains the data structures shared between the API
//! client, the collection store, and the UI:
//!
//! - `CredentialEntry`: a stored name/password record with its server id
//! - `CredentialUpdate`: the confirmed values returned by an entry update

pub mod credential;

pub use credential::{CredentialEntry, CredentialUpdate};
