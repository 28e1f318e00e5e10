//! Integration tests for the session and credential synchronization flow.
//!
//! These tests run the vault client against a mock GraphQL endpoint and
//! verify:
//! - Sign-in granting a session that establishes and restores
//! - The token being re-read from the session store before every request
//! - Failures without validation detail forcing the session-expired path
//! - Validation messages passing through verbatim and in order
//! - Collection reconciliation after list/create/update/delete

use passkeep_core::api::{FailureClass, VaultClient};
use passkeep_core::auth::{SessionData, SessionStore};
use passkeep_core::models::CredentialEntry;
use passkeep_core::vault::CredentialCollection;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: a session store in a fresh temporary directory.
/// The TempDir guard must stay alive for the duration of the test.
fn open_store() -> (SessionStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::open(dir.path()).unwrap();
    (store, dir)
}

/// Helper: a store already holding the session t1/u1/alice
fn signed_in_store() -> (SessionStore, tempfile::TempDir) {
    let (store, dir) = open_store();
    store
        .establish(&SessionData {
            token: "t1".to_string(),
            user_id: "u1".to_string(),
            username: "alice".to_string(),
        })
        .unwrap();
    (store, dir)
}

fn entry(id: &str, name: &str, password: &str) -> CredentialEntry {
    CredentialEntry {
        id: id.to_string(),
        name: name.to_string(),
        password: password.to_string(),
    }
}

fn client_for(server: &MockServer, store: &SessionStore) -> VaultClient {
    VaultClient::new(format!("{}/query", server.uri()), store.clone()).unwrap()
}

// ============================================================================
// Test 1: Sign-in grants a session that establishes and restores
// ============================================================================

#[tokio::test]
async fn test_sign_in_establishes_restorable_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("signIn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "signIn": { "token": "t1", "user": { "id": "u1", "username": "alice" } } }
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = open_store();
    let client = client_for(&mock_server, &store);

    let session = client.sign_in("alice@example.com", "hunter2!").await.unwrap();
    assert_eq!(session.token, "t1");
    assert_eq!(session.user_id, "u1");
    assert_eq!(session.username, "alice");

    store.establish(&session).unwrap();
    let restored = store.restore().unwrap();
    assert_eq!(restored.token, "t1");
    assert_eq!(restored.user_id, "u1");
    assert_eq!(restored.username, "alice");
    assert!(store.is_signed_in());
}

// ============================================================================
// Test 2: The token is read from the store before every request
// ============================================================================

#[tokio::test]
async fn test_token_is_read_before_every_request() {
    let mock_server = MockServer::start().await;
    let empty_list = json!({ "data": { "queryUserPasswords": [] } });

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Authentication", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_list.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Authentication", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_list))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    client.list_credentials("u1").await.unwrap();

    // Replace the session; the very next call must carry the new token
    store
        .establish(&SessionData {
            token: "t2".to_string(),
            user_id: "u1".to_string(),
            username: "alice".to_string(),
        })
        .unwrap();
    client.list_credentials("u1").await.unwrap();
}

// ============================================================================
// Test 3: Authenticated calls refuse to go out without a session
// ============================================================================

#[tokio::test]
async fn test_authenticated_call_without_session_never_sends() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (store, _dir) = open_store();
    let client = client_for(&mock_server, &store);

    let error = client.list_credentials("u1").await.unwrap_err();
    assert_eq!(error.classify(), FailureClass::SessionExpired);
}

// ============================================================================
// Test 4: A failure with no validation detail expires the session
// ============================================================================

#[tokio::test]
async fn test_create_failure_without_detail_clears_session() {
    let mock_server = MockServer::start().await;

    // The service answers a stale token with a bare 401
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("createPassword"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let error = client.create_credential("u1", "github", "pw").await.unwrap_err();
    assert_eq!(error.classify(), FailureClass::SessionExpired);

    // The forced sign-out sequence: clear, then nothing restores
    store.clear().unwrap();
    assert!(store.restore().is_none());
    assert!(!store.is_signed_in());
}

#[tokio::test]
async fn test_envelope_without_data_or_errors_expires_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": null
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let error = client.create_credential("u1", "github", "pw").await.unwrap_err();
    assert_eq!(error.classify(), FailureClass::SessionExpired);
}

#[tokio::test]
async fn test_non_envelope_reply_expires_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let error = client.list_credentials("u1").await.unwrap_err();
    assert_eq!(error.classify(), FailureClass::SessionExpired);
}

// ============================================================================
// Test 5: Validation messages pass through verbatim and in order
// ============================================================================

#[tokio::test]
async fn test_sign_up_rejection_lists_messages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [
                { "message": "field 'Password' with value 'short' violates constraint: min" },
                { "message": "the e-mail address is already taken" }
            ],
            "data": null
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = open_store();
    let client = client_for(&mock_server, &store);

    let error = client
        .sign_up("taken@example.com", "alice", "short")
        .await
        .unwrap_err();
    match error.classify() {
        FailureClass::Validation(messages) => {
            assert_eq!(messages.len(), 2);
            assert_eq!(
                messages[0],
                "field 'Password' with value 'short' violates constraint: min"
            );
            assert_eq!(messages[1], "the e-mail address is already taken");
        }
        FailureClass::SessionExpired => panic!("expected validation"),
    }
}

#[tokio::test]
async fn test_update_rejection_preserves_entry_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("updatePassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [ { "message": "password too short" } ],
            "data": null
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let mut collection = CredentialCollection::new();
    collection.load(vec![entry("1", "github", "old-pass")]);

    let error = client.update_credential("1", "github", "x").await.unwrap_err();
    match error.classify() {
        FailureClass::Validation(messages) => {
            assert_eq!(messages, vec!["password too short".to_string()]);
        }
        FailureClass::SessionExpired => panic!("expected validation"),
    }

    // Nothing was committed to the collection
    assert_eq!(collection.get("1").unwrap().name, "github");
    assert_eq!(collection.get("1").unwrap().password, "old-pass");
    // A validation failure never touches the session
    assert!(store.is_signed_in());
}

// ============================================================================
// Test 6: Listing replaces the collection wholesale
// ============================================================================

#[tokio::test]
async fn test_list_load_replaces_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("queryUserPasswords"))
        .and(header("Authentication", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "queryUserPasswords": [
                { "id": "1", "name": "github", "password": "hunter2" },
                { "id": "2", "name": "mail", "password": "s3cret" }
            ] }
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let mut collection = CredentialCollection::new();
    collection.load(vec![entry("9", "stale", "gone")]);

    let entries = client.list_credentials("u1").await.unwrap();
    collection.load(entries);

    assert_eq!(collection.len(), 2);
    assert!(!collection.contains("9"));
    assert_eq!(collection.entries()[0].id, "1");
    assert_eq!(collection.entries()[1].id, "2");
}

// ============================================================================
// Test 7: A confirmed create appends the server's entry exactly once
// ============================================================================

#[tokio::test]
async fn test_create_appends_server_entry_exactly_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("createPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "createPassword": { "id": "42", "name": "bank", "password": "pw" } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let mut collection = CredentialCollection::new();
    collection.load(vec![entry("1", "github", "hunter2")]);

    let created = client.create_credential("u1", "bank", "pw").await.unwrap();
    assert_eq!(created.id, "42");
    collection.apply_created(created);

    // Appended once, keyed by the server-assigned id, prior order kept
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.entries()[0].id, "1");
    assert_eq!(collection.entries()[1].id, "42");
    assert_eq!(collection.entries()[1].name, "bank");
}

// ============================================================================
// Test 8: A confirmed update commits the server's values
// ============================================================================

#[tokio::test]
async fn test_update_commits_confirmed_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("updatePassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updatePassword": { "name": "github-work", "password": "rotated" } }
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let mut collection = CredentialCollection::new();
    collection.load(vec![entry("1", "github", "hunter2"), entry("2", "mail", "s3cret")]);

    let confirmed = client
        .update_credential("1", "github-work", "rotated")
        .await
        .unwrap();
    assert!(collection.apply_updated("1", confirmed.name, confirmed.password));

    // Only the target entry changed
    assert_eq!(collection.get("1").unwrap().name, "github-work");
    assert_eq!(collection.get("1").unwrap().password, "rotated");
    assert_eq!(collection.get("2").unwrap().name, "mail");
    assert_eq!(collection.get("2").unwrap().password, "s3cret");
}

// ============================================================================
// Test 9: A confirmed delete removes the entry
// ============================================================================

#[tokio::test]
async fn test_delete_removes_entry_from_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("deletePassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "deletePassword": true }
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = signed_in_store();
    let client = client_for(&mock_server, &store);

    let mut collection = CredentialCollection::new();
    collection.load(vec![entry("1", "a", "x")]);

    client.delete_credential("1").await.unwrap();
    assert!(collection.apply_deleted("1"));
    assert!(collection.is_empty());
}

// ============================================================================
// Test 10: Sign-up returns the registered email
// ============================================================================

#[tokio::test]
async fn test_sign_up_returns_registered_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "signUp": { "email": "new@example.com" } }
        })))
        .mount(&mock_server)
        .await;

    let (store, _dir) = open_store();
    let client = client_for(&mock_server, &store);

    let email = client
        .sign_up("new@example.com", "bob", "longenough1!")
        .await
        .unwrap();
    assert_eq!(email, "new@example.com");
}
