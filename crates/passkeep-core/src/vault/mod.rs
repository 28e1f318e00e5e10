//! In-memory credential collection for the signed-in user.
//!
//! This module provides the `CredentialCollection`, the ordered set of
//! entries reconciled against the vault service: loaded wholesale on
//! dashboard activation, then mutated one confirmed call at a time.

pub mod collection;

pub use collection::CredentialCollection;
