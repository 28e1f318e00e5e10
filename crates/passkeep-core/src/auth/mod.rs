//! Authentication module for managing the user session and stored
//! credentials.
//!
//! This module provides:
//! - `SessionStore`: the persisted session (token + user identity),
//!   sealed at rest, with change notifications for subscribers
//! - `SessionSealer`: the at-rest encryption for the session file
//! - `CredentialStore`: remember-me password storage via the OS keychain

pub mod credentials;
pub mod seal;
pub mod session;

pub use credentials::CredentialStore;
pub use seal::SessionSealer;
pub use session::{SessionData, SessionStore};
