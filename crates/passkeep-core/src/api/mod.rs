//! GraphQL API client module for the vault service.
//!
//! This module provides the `VaultClient` for the six vault operations
//! and the `VaultError`/`FailureClass` pair that decides how a failed
//! call is handled: structured rejections surface as validation messages,
//! everything else means the session can no longer be trusted.
//!
//! Authenticated operations carry the raw session token in the
//! `Authentication` header, read from the session store per request.

pub mod client;
pub mod error;

pub use client::VaultClient;
pub use error::{FailureClass, VaultError};
