use serde::{Deserialize, Serialize};

/// One stored credential entry belonging to a user.
///
/// The `id` is assigned by the vault service and is the entry's identity
/// everywhere in the client; it is never generated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub id: String,
    pub name: String,
    pub password: String,
}

/// Server-confirmed values returned by a successful entry update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialUpdate {
    pub name: String,
    pub password: String,
}
