//! Entry store contract and in-memory implementation
//!
//! The index only needs read access (`EntryStore`). Callers that mutate
//! entries go through `WritableStore`.

use crate::entry::{DiaryEntry, StoreError, StoreResult};
use std::collections::HashMap;

/// Read side of a keyed entry store
pub trait EntryStore {
    /// Current entry for an identifier, `None` if absent
    fn get(&self, id: &str) -> Option<&DiaryEntry>;

    /// All stored entries, order unspecified
    fn values(&self) -> Box<dyn Iterator<Item = &DiaryEntry> + '_>;

    /// Number of stored entries
    fn len(&self) -> usize {
        self.values().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write side of a keyed entry store
pub trait WritableStore: EntryStore {
    /// Insert or replace an entry, returning the previous version
    fn put(&mut self, entry: DiaryEntry) -> StoreResult<Option<DiaryEntry>>;

    /// Delete an entry, returning it if it existed
    fn delete(&mut self, id: &str) -> StoreResult<Option<DiaryEntry>>;
}

/// Reject entries the index cannot key on
pub(crate) fn validate(entry: &DiaryEntry) -> StoreResult<()> {
    if entry.id.trim().is_empty() {
        return Err(StoreError::InvalidEntry("entry id must not be empty".into()));
    }
    Ok(())
}

/// HashMap-backed store, mostly for tests and ephemeral sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, DiaryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of entries (later duplicates win)
    pub fn from_entries(entries: impl IntoIterator<Item = DiaryEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, id: &str) -> Option<&DiaryEntry> {
        self.entries.get(id)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &DiaryEntry> + '_> {
        Box::new(self.entries.values())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl WritableStore for MemoryStore {
    fn put(&mut self, entry: DiaryEntry) -> StoreResult<Option<DiaryEntry>> {
        validate(&entry)?;
        Ok(self.entries.insert(entry.id.clone(), entry))
    }

    fn delete(&mut self, id: &str) -> StoreResult<Option<DiaryEntry>> {
        Ok(self.entries.remove(id))
    }
}
