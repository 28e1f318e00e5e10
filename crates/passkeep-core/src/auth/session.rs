use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use super::seal::SessionSealer;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.vault";

/// The signed-in user's credential bundle.
///
/// All three fields exist together or not at all; a session holding a
/// token without the user identity is not representable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

/// Persistent store for the current session.
///
/// The sealed file on disk is the single source of truth: `restore` and
/// `current_token` re-read it on every call rather than caching, so a
/// cleared session can never leak a stale token into an outgoing request.
/// `establish` and `clear` publish the new state to subscribers.
///
/// Cloning is cheap; all clones share the same store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    data_dir: PathBuf,
    sealer: SessionSealer,
    changes: watch::Sender<Option<SessionData>>,
}

impl SessionStore {
    /// Opens the store rooted at `data_dir`, creating the directory and
    /// device key on first run.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        let sealer = SessionSealer::open(data_dir)?;
        let (changes, _) = watch::channel(None);

        let store = Self {
            inner: Arc::new(StoreInner {
                data_dir: data_dir.to_path_buf(),
                sealer,
                changes,
            }),
        };
        // Seed subscribers with whatever survived the last run
        store.inner.changes.send_replace(store.restore());
        Ok(store)
    }

    /// Reads the persisted session from disk, or `None`.
    ///
    /// An unreadable, tampered, or malformed session file counts as
    /// signed out.
    pub fn restore(&self) -> Option<SessionData> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }
        let record = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to read session file");
                return None;
            }
        };
        let plaintext = match self.inner.sealer.unseal(&record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "session file failed authentication, treating as signed out");
                return None;
            }
        };
        match serde_json::from_slice(&plaintext) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "session file did not parse, treating as signed out");
                None
            }
        }
    }

    /// Persists a new session.
    ///
    /// All three fields land together: the sealed record is written to a
    /// temporary path and renamed over the session file, so no reader can
    /// observe a partial session.
    pub fn establish(&self, data: &SessionData) -> Result<()> {
        let plaintext = serde_json::to_vec(data).context("Failed to encode session")?;
        let record = self.inner.sealer.seal(&plaintext)?;

        let path = self.session_path();
        let tmp = path.with_extension("vault.tmp");
        fs::write(&tmp, &record)
            .with_context(|| format!("Failed to write session file: {}", tmp.display()))?;
        fs::rename(&tmp, &path).context("Failed to move session file into place")?;

        self.inner.changes.send_replace(Some(data.clone()));
        Ok(())
    }

    /// Removes the persisted session. Clearing an absent session succeeds.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove session file")?;
        }
        self.inner.changes.send_replace(None);
        Ok(())
    }

    /// The current token, read from disk at call time.
    pub fn current_token(&self) -> Option<String> {
        self.restore().map(|d| d.token)
    }

    /// True when a session is currently persisted.
    pub fn is_signed_in(&self) -> bool {
        self.restore().is_some()
    }

    /// Subscribes to the changes published by `establish` and `clear`.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionData>> {
        self.inner.changes.subscribe()
    }

    fn session_path(&self) -> PathBuf {
        self.inner.data_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionData {
        SessionData {
            token: "t1".to_string(),
            user_id: "u1".to_string(),
            username: "alice".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Round-trip Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_establish_then_restore_returns_same_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.establish(&session()).unwrap();
        let restored = store.restore().unwrap();
        assert_eq!(restored.token, "t1");
        assert_eq!(restored.user_id, "u1");
        assert_eq!(restored.username, "alice");
        assert!(store.is_signed_in());
    }

    #[test]
    fn test_restore_with_no_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        assert!(store.restore().is_none());
        assert!(store.current_token().is_none());
    }

    #[test]
    fn test_establish_replaces_prior_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.establish(&session()).unwrap();
        store
            .establish(&SessionData {
                token: "t2".to_string(),
                user_id: "u2".to_string(),
                username: "bob".to_string(),
            })
            .unwrap();

        // Read-through: the next token lookup sees the replacement
        assert_eq!(store.current_token().as_deref(), Some("t2"));
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SessionStore::open(dir.path()).unwrap();
            store.establish(&session()).unwrap();
        }

        // Fresh handle over the same directory restores the session
        let store = SessionStore::open(dir.path()).unwrap();
        assert_eq!(store.restore().unwrap().username, "alice");
    }

    // -------------------------------------------------------------------------
    // Clear Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_clear_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.establish(&session()).unwrap();
        store.clear().unwrap();
        assert!(store.restore().is_none());
        assert!(store.current_token().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.restore().is_none());
    }

    // -------------------------------------------------------------------------
    // Tampering Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tampered_session_file_restores_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.establish(&session()).unwrap();

        let path = dir.path().join(SESSION_FILE);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&path, bytes).unwrap();

        assert!(store.restore().is_none());
    }

    // -------------------------------------------------------------------------
    // Subscription Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_subscribers_see_establish_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let mut rx = store.subscribe();

        assert!(!rx.has_changed().unwrap());

        store.establish(&session()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|d| d.username.clone()),
            Some("alice".to_string())
        );

        store.clear().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_clones_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let other = store.clone();

        store.establish(&session()).unwrap();
        assert_eq!(other.current_token().as_deref(), Some("t1"));
    }
}
