use tracing::{debug, warn};

use crate::models::CredentialEntry;

/// In-memory view of the signed-in user's credential entries.
///
/// Insertion order is display order. Entries are keyed by their
/// server-assigned id and no two entries share one. The collection is
/// populated wholesale from the server and only mutated through the
/// `apply_*` methods as individual calls succeed; it is discarded
/// entirely on sign-out.
#[derive(Debug, Clone, Default)]
pub struct CredentialCollection {
    entries: Vec<CredentialEntry>,
}

impl CredentialCollection {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replaces the whole collection with the server's entry list.
    ///
    /// No merging with prior state. Duplicate ids in the reply keep the
    /// first occurrence.
    pub fn load(&mut self, entries: Vec<CredentialEntry>) {
        self.entries.clear();
        for entry in entries {
            if self.contains(&entry.id) {
                warn!(id = %entry.id, "duplicate entry id in server reply, keeping first");
                continue;
            }
            self.entries.push(entry);
        }
    }

    /// Appends an entry the server confirmed creating.
    pub fn apply_created(&mut self, entry: CredentialEntry) {
        match self.position(&entry.id) {
            Some(index) => {
                // Should not happen with server-assigned ids; replace rather
                // than violate the unique-id invariant.
                warn!(id = %entry.id, "created entry id already present, replacing");
                self.entries[index] = entry;
            }
            None => self.entries.push(entry),
        }
    }

    /// Overwrites one entry with the values the server confirmed saving.
    ///
    /// Returns false when the id is no longer present (deleted while the
    /// save was in flight); the result is dropped.
    pub fn apply_updated(&mut self, id: &str, name: String, password: String) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.name = name;
                entry.password = password;
                true
            }
            None => {
                debug!(id, "update confirmed for absent entry, ignoring");
                false
            }
        }
    }

    /// Removes one entry by id. Absent ids are a no-op.
    pub fn apply_deleted(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => {
                debug!(id, "delete confirmed for absent entry, ignoring");
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, password: &str) -> CredentialEntry {
        CredentialEntry {
            id: id.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Load Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_replaces_prior_state() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "old", "x")]);
        collection.load(vec![entry("2", "github", "hunter2"), entry("3", "mail", "s3cret")]);

        // Full replace: nothing from the first load survives
        assert_eq!(collection.len(), 2);
        assert!(!collection.contains("1"));
        assert_eq!(collection.entries()[0].id, "2");
        assert_eq!(collection.entries()[1].id, "3");
    }

    #[test]
    fn test_load_keeps_first_of_duplicate_ids() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![
            entry("1", "first", "a"),
            entry("2", "other", "b"),
            entry("1", "second", "c"),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("1").unwrap().name, "first");
    }

    // -------------------------------------------------------------------------
    // Create Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_created_appends_exactly_once() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x"), entry("2", "b", "y")]);
        collection.apply_created(entry("3", "c", "z"));

        // Appended at the end, prior order untouched
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.entries()[0].id, "1");
        assert_eq!(collection.entries()[1].id, "2");
        assert_eq!(collection.entries()[2].id, "3");
    }

    #[test]
    fn test_created_replaces_colliding_id() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x")]);
        collection.apply_created(entry("1", "renamed", "y"));

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("1").unwrap().name, "renamed");
    }

    // -------------------------------------------------------------------------
    // Update Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_updated_changes_only_target() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x"), entry("2", "b", "y")]);

        assert!(collection.apply_updated("2", "b2".into(), "y2".into()));
        assert_eq!(collection.get("1").unwrap().name, "a");
        assert_eq!(collection.get("1").unwrap().password, "x");
        assert_eq!(collection.get("2").unwrap().name, "b2");
        assert_eq!(collection.get("2").unwrap().password, "y2");
    }

    #[test]
    fn test_updated_absent_id_is_noop() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x")]);

        // Entry deleted while a save was in flight
        assert!(!collection.apply_updated("9", "n".into(), "p".into()));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("1").unwrap().name, "a");
    }

    // -------------------------------------------------------------------------
    // Delete Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_deleted_removes_only_target_preserving_order() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![
            entry("1", "a", "x"),
            entry("2", "b", "y"),
            entry("3", "c", "z"),
        ]);

        assert!(collection.apply_deleted("2"));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.entries()[0].id, "1");
        assert_eq!(collection.entries()[1].id, "3");
    }

    #[test]
    fn test_deleted_last_entry_leaves_empty() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x")]);

        assert!(collection.apply_deleted("1"));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_deleted_absent_id_is_noop() {
        let mut collection = CredentialCollection::new();
        collection.load(vec![entry("1", "a", "x")]);

        assert!(!collection.apply_deleted("9"));
        assert!(!collection.apply_deleted("9")); // Idempotent
        assert_eq!(collection.len(), 1);
    }
}
