//! GraphQL client for the vault service.
//!
//! This module provides the `VaultClient` for issuing the six vault
//! operations: account sign-up and sign-in, plus credential list, create,
//! update, and delete. Authenticated calls read the token from the
//! session store immediately before each request goes out.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{SessionData, SessionStore};
use crate::models::{CredentialEntry, CredentialUpdate};

use super::VaultError;

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the session token.
/// The service expects the bare token, not a `Bearer` scheme.
const AUTH_HEADER: &str = "Authentication";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

// GraphQL documents, matching the service schema

const SIGN_UP: &str = "mutation SignUp($email: String!, $username:String!, $password: String!) { signUp(input: {email:$email, username: $username, password:$password}) { email } }";

const SIGN_IN: &str = "mutation SignIn($email: String!, $password: String!) { signIn(input: {email:$email, password:$password}) { token user{ id username } } }";

const LIST_CREDENTIALS: &str = "query QueryUserPassword($userId: String!) { queryUserPasswords(userId: $userId) { id name password } }";

const CREATE_CREDENTIAL: &str = "mutation CreatePassword($userId: ID!, $name: String!, $password: String!){ createPassword(input: {userId: $userId, name: $name, password: $password}){ id name password } }";

const UPDATE_CREDENTIAL: &str = "mutation UpdatePassword($passwordId: ID!, $name: String!, $password: String!){ updatePassword(input: {id: $passwordId, name: $name, password: $password}){ name password } }";

const DELETE_CREDENTIAL: &str = "mutation DeletePassword($passwordId: ID!){ deletePassword(input: $passwordId) }";

/// Client for the vault service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct VaultClient {
    client: Client,
    endpoint: String,
    session: SessionStore,
}

impl VaultClient {
    /// Create a new client for `endpoint`, reading tokens from `session`
    pub fn new(endpoint: impl Into<String>, session: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            session,
        })
    }

    /// Register a new account, returning the registered email
    pub async fn sign_up(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<String, VaultError> {
        let data: SignUpData = self
            .execute(
                SIGN_UP,
                json!({ "email": email, "username": username, "password": password }),
                false,
            )
            .await?;
        Ok(data.sign_up.email)
    }

    /// Sign in, returning the granted session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData, VaultError> {
        let data: SignInData = self
            .execute(SIGN_IN, json!({ "email": email, "password": password }), false)
            .await?;
        Ok(SessionData {
            token: data.sign_in.token,
            user_id: data.sign_in.user.id,
            username: data.sign_in.user.username,
        })
    }

    /// Fetch every credential entry belonging to `user_id`
    pub async fn list_credentials(&self, user_id: &str) -> Result<Vec<CredentialEntry>, VaultError> {
        let data: ListData = self
            .execute(LIST_CREDENTIALS, json!({ "userId": user_id }), true)
            .await?;
        Ok(data.entries)
    }

    /// Create an entry, returning it with its server-assigned id
    pub async fn create_credential(
        &self,
        user_id: &str,
        name: &str,
        password: &str,
    ) -> Result<CredentialEntry, VaultError> {
        let data: CreateData = self
            .execute(
                CREATE_CREDENTIAL,
                json!({ "userId": user_id, "name": name, "password": password }),
                true,
            )
            .await?;
        Ok(data.entry)
    }

    /// Save new values for an entry, returning the server-confirmed values
    pub async fn update_credential(
        &self,
        id: &str,
        name: &str,
        password: &str,
    ) -> Result<CredentialUpdate, VaultError> {
        let data: UpdateData = self
            .execute(
                UPDATE_CREDENTIAL,
                json!({ "passwordId": id, "name": name, "password": password }),
                true,
            )
            .await?;
        Ok(data.update)
    }

    /// Delete an entry by id
    pub async fn delete_credential(&self, id: &str) -> Result<(), VaultError> {
        let data: DeleteData = self
            .execute(DELETE_CREDENTIAL, json!({ "passwordId": id }), true)
            .await?;
        debug!(acknowledged = data.marker, "entry delete confirmed");
        Ok(())
    }

    /// Issues one GraphQL request and unwraps the reply envelope.
    ///
    /// For authenticated calls the token is read from the session store
    /// here, immediately before the send; the client never caches it.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        authenticated: bool,
    ) -> Result<T, VaultError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));

        if authenticated {
            let token = self.session.current_token().ok_or(VaultError::NoSession)?;
            request = request.header(AUTH_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, "vault request failed without validation detail");
            return Err(VaultError::BadStatus { status });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "vault reply was not a valid envelope");
            VaultError::Decode(e.to_string())
        })?;

        if !envelope.errors.is_empty() {
            return Err(VaultError::Rejected(
                envelope.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        envelope.data.ok_or(VaultError::MissingData)
    }
}

// Internal reply envelope types for parsing

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignUpData {
    #[serde(rename = "signUp")]
    sign_up: RegisteredAccount,
}

#[derive(Debug, Deserialize)]
struct RegisteredAccount {
    email: String,
}

#[derive(Debug, Deserialize)]
struct SignInData {
    #[serde(rename = "signIn")]
    sign_in: SignInGrant,
}

#[derive(Debug, Deserialize)]
struct SignInGrant {
    token: String,
    user: GrantUser,
}

#[derive(Debug, Deserialize)]
struct GrantUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(rename = "queryUserPasswords")]
    entries: Vec<CredentialEntry>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "createPassword")]
    entry: CredentialEntry,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "updatePassword")]
    update: CredentialUpdate,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "deletePassword")]
    marker: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sign_in_envelope() {
        let json = r#"{"data":{"signIn":{"token":"t1","user":{"id":"u1","username":"alice"}}}}"#;

        let envelope: Envelope<SignInData> = serde_json::from_str(json)
            .expect("Failed to parse sign-in test JSON");
        assert!(envelope.errors.is_empty());

        let grant = envelope.data.unwrap().sign_in;
        assert_eq!(grant.token, "t1");
        assert_eq!(grant.user.id, "u1");
        assert_eq!(grant.user.username, "alice");
    }

    #[test]
    fn test_parse_error_envelope_keeps_message_order() {
        let json = r#"{"errors":[{"message":"first problem"},{"message":"second problem"}],"data":null}"#;

        let envelope: Envelope<SignInData> = serde_json::from_str(json)
            .expect("Failed to parse error test JSON");
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors.len(), 2);
        assert_eq!(envelope.errors[0].message, "first problem");
        assert_eq!(envelope.errors[1].message, "second problem");
    }

    #[test]
    fn test_parse_list_envelope() {
        let json = r#"{"data":{"queryUserPasswords":[{"id":"1","name":"github","password":"hunter2"},{"id":"2","name":"mail","password":"s3cret"}]}}"#;

        let envelope: Envelope<ListData> = serde_json::from_str(json)
            .expect("Failed to parse list test JSON");
        let entries = envelope.data.unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[0].name, "github");
        assert_eq!(entries[1].password, "s3cret");
    }

    #[test]
    fn test_parse_delete_marker() {
        let json = r#"{"data":{"deletePassword":true}}"#;

        let envelope: Envelope<DeleteData> = serde_json::from_str(json)
            .expect("Failed to parse delete test JSON");
        assert!(envelope.data.unwrap().marker);
    }
}
