//! Diary service
//!
//! Owns an entry store and its index and keeps them in step:
//! - Write path: validate → store → one index call per logical change
//! - Read path: ensure index → ids from index → resolve through store
//!
//! Single-threaded; callers that share a `Diary` wrap it themselves.

use crate::entry::{DiaryEntry, EntryPatch, StoreError, StoreResult, WritableStore};
use crate::index::{IndexConfig, IndexManager, IndexStats};
use chrono::NaiveDate;

/// Options for opening a diary
#[derive(Debug, Clone, Default)]
pub struct DiaryOptions {
    /// Build the index immediately instead of on first use
    pub eager_index: bool,
    pub index: IndexConfig,
}

/// A store plus its index
#[derive(Debug)]
pub struct Diary<S: WritableStore> {
    store: S,
    index: IndexManager,
}

impl<S: WritableStore> Diary<S> {
    /// Wrap a store with a lazily built index
    pub fn new(store: S) -> Self {
        Self::with_options(store, DiaryOptions::default())
    }

    pub fn with_options(store: S, options: DiaryOptions) -> Self {
        let mut index = IndexManager::with_config(options.index);
        if options.eager_index {
            index.build_index(&store);
        }
        Self { store, index }
    }

    // ==================== Write Path ====================

    /// Store a new entry and index it. Returns its id.
    pub fn create(&mut self, entry: DiaryEntry) -> StoreResult<String> {
        if self.store.get(&entry.id).is_some() {
            return Err(StoreError::DuplicateId(entry.id));
        }
        self.index.ensure_index(&self.store);

        let id = entry.id.clone();
        self.store.put(entry.clone())?;
        self.index.insert_entry(&self.store, &entry);

        tracing::info!(%id, date = %entry.date, "created diary entry");
        Ok(id)
    }

    /// Apply a patch to an existing entry, returning the updated entry
    pub fn edit(&mut self, id: &str, patch: EntryPatch) -> StoreResult<DiaryEntry> {
        let mut entry = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.index.ensure_index(&self.store);

        let date_changed = patch.changes_date(&entry);
        let text_changed = patch.changes_text(&entry);
        patch.apply(&mut entry);
        self.store.put(entry.clone())?;

        if date_changed {
            self.index.update_entry_date(&self.store, &entry);
        }
        if text_changed {
            self.index.update_entry_search_text(&entry);
        }

        tracing::info!(id, date_changed, text_changed, "edited diary entry");
        Ok(entry)
    }

    /// Delete an entry from store and index
    pub fn delete(&mut self, id: &str) -> StoreResult<DiaryEntry> {
        self.index.ensure_index(&self.store);
        let removed = self
            .store
            .delete(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.index.remove_entry(id);

        tracing::info!(id, "deleted diary entry");
        Ok(removed)
    }

    /// Build the index if it has not been built yet
    pub fn ensure_index(&mut self) {
        self.index.ensure_index(&self.store);
    }

    /// Force a full rebuild of the index
    pub fn rebuild(&mut self) -> IndexStats {
        self.index.build_index(&self.store);
        self.index.stats()
    }

    // ==================== Read Path ====================

    pub fn get(&self, id: &str) -> Option<&DiaryEntry> {
        self.store.get(id)
    }

    /// A page of entries, most recent first
    pub fn list(&mut self, offset: usize, limit: usize) -> Vec<&DiaryEntry> {
        self.index.ensure_index(&self.store);
        self.resolve(self.index.page(offset, limit))
    }

    /// A page of the entries carrying `tag`, most recent first
    pub fn list_tagged(&mut self, tag: &str, offset: usize, limit: usize) -> Vec<&DiaryEntry> {
        self.index.ensure_index(&self.store);
        self.index
            .ids_by_date_desc()
            .iter()
            .filter_map(|id| self.store.get(id))
            .filter(|entry| entry.has_tag(tag))
            .skip(offset)
            .take(limit)
            .collect()
    }

    /// Entries whose day lies in `[start_day, end_day]`, most recent first
    pub fn entries_between(
        &mut self,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Vec<&DiaryEntry> {
        self.index.ensure_index(&self.store);
        self.resolve(self.index.ids_in_range(start_day, end_day))
    }

    /// Entries whose text contains `query` (case-insensitive), most recent first
    pub fn search(&mut self, query: &str) -> Vec<&DiaryEntry> {
        self.index.ensure_index(&self.store);
        self.index
            .search(query)
            .into_iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    /// Resolve ids through the store, skipping dangling ones
    fn resolve(&self, ids: &[String]) -> Vec<&DiaryEntry> {
        ids.iter().filter_map(|id| self.store.get(id)).collect()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store, dropping the index
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryStore, JsonFileStore, MemoryStore};
    use chrono::{DateTime, TimeZone, Utc};
    use std::path::Path;
    use tempfile::tempdir;

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, 12, 0, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn titles(entries: &[&DiaryEntry]) -> Vec<String> {
        entries.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_create_and_list() {
        let mut diary = Diary::new(MemoryStore::new());
        diary.create(DiaryEntry::with_id("a", at(3, 10), "Ten")).unwrap();
        diary.create(DiaryEntry::with_id("b", at(3, 12), "Twelve")).unwrap();
        diary.create(DiaryEntry::with_id("c", at(3, 11), "Eleven")).unwrap();

        assert_eq!(titles(&diary.list(0, 10)), vec!["Twelve", "Eleven", "Ten"]);
        assert_eq!(titles(&diary.list(1, 1)), vec!["Eleven"]);
        assert_eq!(diary.stats().rebuilds, 1);
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let mut diary = Diary::new(MemoryStore::new());
        diary.create(DiaryEntry::with_id("a", at(3, 10), "One")).unwrap();

        let err = diary.create(DiaryEntry::with_id("a", at(3, 11), "Two")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "a"));
        assert_eq!(diary.index().ids_by_date_desc().len(), 1);
    }

    #[test]
    fn test_edit_date_and_text() {
        let mut diary = Diary::new(MemoryStore::new());
        diary.create(DiaryEntry::with_id("a", at(3, 10), "Park")).unwrap();
        diary.create(DiaryEntry::with_id("b", at(3, 12), "Museum")).unwrap();

        diary
            .edit("a", EntryPatch::new().date(at(3, 13)).title("Beach"))
            .unwrap();

        assert_eq!(diary.index().ids_by_date_desc(), &["a", "b"]);
        assert_eq!(titles(&diary.search("beach")), vec!["Beach"]);
        assert!(diary.search("park").is_empty());
    }

    #[test]
    fn test_list_tagged() {
        let mut diary = Diary::new(MemoryStore::new());
        diary.create(DiaryEntry::with_id("a", at(3, 10), "Dunes").tag("beach")).unwrap();
        diary.create(DiaryEntry::with_id("b", at(3, 11), "Museum").tag("city")).unwrap();
        diary.create(DiaryEntry::with_id("c", at(3, 12), "Pier").tags(["beach", "city"])).unwrap();

        assert_eq!(titles(&diary.list_tagged("beach", 0, 10)), vec!["Pier", "Dunes"]);
        assert_eq!(titles(&diary.list_tagged("beach", 1, 10)), vec!["Dunes"]);
        assert_eq!(titles(&diary.list_tagged("city", 0, 1)), vec!["Pier"]);
        assert!(diary.list_tagged("mountain", 0, 10).is_empty());
    }

    #[test]
    fn test_edit_missing_entry() {
        let mut diary = Diary::new(MemoryStore::new());
        let err = diary.edit("nope", EntryPatch::new().title("x")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let mut diary = Diary::new(MemoryStore::new());
        diary.create(DiaryEntry::with_id("a", at(3, 10), "One")).unwrap();

        let removed = diary.delete("a").unwrap();
        assert_eq!(removed.title, "One");
        assert!(diary.list(0, 10).is_empty());
        assert!(diary.index().search_index().is_empty());
        assert!(matches!(diary.delete("a"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_entries_between() {
        let store = MemoryStore::from_entries(vec![
            DiaryEntry::with_id("a", at(1, 1), "Jan 1"),
            DiaryEntry::with_id("b", at(1, 3), "Jan 3"),
            DiaryEntry::with_id("c", at(1, 5), "Jan 5"),
        ]);
        let mut diary = Diary::new(store);

        assert_eq!(
            titles(&diary.entries_between(day(1, 2), day(1, 5))),
            vec!["Jan 5", "Jan 3"]
        );
        assert!(diary.entries_between(day(2, 1), day(2, 28)).is_empty());
    }

    #[test]
    fn test_eager_index() {
        let store = MemoryStore::from_entries(vec![DiaryEntry::with_id("a", at(1, 1), "x")]);
        let diary = Diary::with_options(
            store,
            DiaryOptions {
                eager_index: true,
                ..Default::default()
            },
        );

        assert!(diary.index().is_built());
        assert_eq!(diary.stats().entries, 1);
    }

    /// Swap a directory for a plain file so the store cannot write into it
    fn block_dir(dir: &Path) {
        std::fs::remove_dir_all(dir).unwrap();
        std::fs::write(dir, b"").unwrap();
    }

    fn unblock_dir(dir: &Path) {
        std::fs::remove_file(dir).unwrap();
        std::fs::create_dir(dir).unwrap();
    }

    /// Diary over a JSON store in `dir/data` holding entries "a" and "b"
    fn file_diary(dir: &Path) -> Diary<JsonFileStore> {
        let store = JsonFileStore::open(dir.join("data").join("entries.json")).unwrap();
        let mut diary = Diary::new(store);
        diary.create(DiaryEntry::with_id("a", at(3, 10), "Park")).unwrap();
        diary.create(DiaryEntry::with_id("b", at(3, 12), "Museum")).unwrap();
        diary
    }

    #[test]
    fn test_failed_create_leaves_store_and_index_unchanged() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let mut diary = file_diary(dir.path());

        block_dir(&data_dir);
        let err = diary.create(DiaryEntry::with_id("c", at(3, 14), "Beach")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(diary.get("c").is_none());
        assert_eq!(diary.index().ids_by_date_desc(), &["b", "a"]);
        assert!(diary.index().search_index().get("c").is_none());

        // Once the disk is writable again the same entry goes through
        unblock_dir(&data_dir);
        diary.create(DiaryEntry::with_id("c", at(3, 14), "Beach")).unwrap();
        assert_eq!(diary.index().ids_by_date_desc(), &["c", "b", "a"]);
    }

    #[test]
    fn test_failed_edit_keeps_old_date_and_text() {
        let dir = tempdir().unwrap();
        let mut diary = file_diary(dir.path());

        block_dir(&dir.path().join("data"));
        let patch = EntryPatch::new().date(at(3, 13)).title("Beach");
        assert!(diary.edit("a", patch).is_err());

        let stored = diary.get("a").unwrap();
        assert_eq!(stored.date, at(3, 10));
        assert_eq!(stored.title, "Park");
        assert_eq!(diary.index().ids_by_date_desc(), &["b", "a"]);
        assert_eq!(titles(&diary.search("park")), vec!["Park"]);
        assert!(diary.search("beach").is_empty());
        assert!(diary.index().is_consistent());
    }

    #[test]
    fn test_failed_delete_keeps_entry_indexed() {
        let dir = tempdir().unwrap();
        let mut diary = file_diary(dir.path());

        block_dir(&dir.path().join("data"));
        assert!(diary.delete("a").is_err());

        assert!(diary.get("a").is_some());
        assert_eq!(titles(&diary.list(0, 10)), vec!["Museum", "Park"]);
        assert_eq!(titles(&diary.search("park")), vec!["Park"]);
    }

    #[test]
    fn test_file_backed_diary_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.json");

        {
            let mut diary = Diary::new(JsonFileStore::open(&path).unwrap());
            diary.create(DiaryEntry::with_id("a", at(5, 1), "May").tag("spring")).unwrap();
            diary.create(DiaryEntry::with_id("b", at(6, 1), "June")).unwrap();
        }

        let mut diary = Diary::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(titles(&diary.list(0, 10)), vec!["June", "May"]);
        assert_eq!(titles(&diary.search("SPRING")), vec!["May"]);
        assert_eq!(diary.into_store().len(), 2);
    }
}
