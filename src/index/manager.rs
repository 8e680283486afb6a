//! Index Manager - keeps the date and search indexes in step with the store
//!
//! Every logical mutation of the entry store is followed by exactly one call
//! here:
//!
//! ```text
//! create  → insert_entry
//! re-date → update_entry_date
//! re-text → update_entry_search_text
//! delete  → remove_entry
//! ```
//!
//! The index starts Unbuilt and becomes Built on the first `build_index`
//! (directly or through `ensure_index`). Read paths call `ensure_index`
//! first. Nothing here returns an error: unknown ids are no-ops and dangling
//! references are handled according to [`DanglingPolicy`].

use crate::entry::{DiaryEntry, EntryStore};
use crate::index::{searchable_text, DateIndex, IndexStats, SearchIndex};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::ops::Range;
use std::str::FromStr;

/// What to do when an insertion search visits an id the store no longer has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Treat the missing entry as older than anything and keep going
    #[default]
    Oldest,
    /// Rebuild the whole index from the store
    Rebuild,
}

impl FromStr for DanglingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oldest" => Ok(DanglingPolicy::Oldest),
            "rebuild" => Ok(DanglingPolicy::Rebuild),
            other => Err(format!("unknown dangling policy: {}", other)),
        }
    }
}

/// Configuration for the index manager
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    pub dangling_policy: DanglingPolicy,
}

/// Coordinates the date index and the search index
#[derive(Debug, Default)]
pub struct IndexManager {
    /// Ids + day keys, most recent first
    date_index: DateIndex,
    /// Id → searchable text
    search_index: SearchIndex,
    /// Set by the first build
    built: bool,
    config: IndexConfig,
    rebuilds: u64,
    dangling_lookups: u64,
}

impl IndexManager {
    /// Create an empty, unbuilt index manager
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    // ==================== Lifecycle ====================

    /// Rebuild everything from the store
    ///
    /// Entries are ordered by full timestamp (newest first); entries with the
    /// same timestamp keep the order the store yields them in.
    pub fn build_index<S>(&mut self, store: &S)
    where
        S: EntryStore + ?Sized,
    {
        let mut entries: Vec<&DiaryEntry> = store.values().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let texts: HashMap<String, String> = entries
            .iter()
            .map(|e| (e.id.clone(), searchable_text(e)))
            .collect();

        self.date_index.replace(
            entries
                .iter()
                .map(|e| (e.id.clone(), e.day_key()))
                .collect(),
        );
        self.search_index.replace(texts);
        self.built = true;
        self.rebuilds += 1;

        tracing::info!(
            entries = self.date_index.len(),
            rebuilds = self.rebuilds,
            "diary index built"
        );
    }

    /// Build the index unless it is already built
    pub fn ensure_index<S>(&mut self, store: &S)
    where
        S: EntryStore + ?Sized,
    {
        if !self.built {
            self.build_index(store);
        }
    }

    // ==================== Incremental Updates ====================

    /// Index a newly created entry
    ///
    /// An id that is already indexed is moved rather than duplicated.
    pub fn insert_entry<S>(&mut self, store: &S, entry: &DiaryEntry)
    where
        S: EntryStore + ?Sized,
    {
        if self.date_index.remove(&entry.id).is_some() {
            tracing::debug!(id = %entry.id, "insert of already indexed entry, repositioning");
        }
        self.place(store, entry);
        self.search_index.set(entry.id.clone(), searchable_text(entry));
        tracing::debug!(id = %entry.id, "indexed entry");
    }

    /// Move an entry to the position given by its (new) date
    ///
    /// The entry's search text is left alone, even when a dangling reference
    /// triggers a rebuild under [`DanglingPolicy::Rebuild`]; every other
    /// entry's text is then re-derived from the store. An entry that was
    /// never indexed is placed anyway.
    pub fn update_entry_date<S>(&mut self, store: &S, entry: &DiaryEntry)
    where
        S: EntryStore + ?Sized,
    {
        let text = self.search_index.get(&entry.id).map(str::to_owned);
        let previous = self.date_index.remove(&entry.id);

        if self.place(store, entry) {
            match text {
                Some(text) => self.search_index.set(entry.id.clone(), text),
                None => {
                    self.search_index.remove(&entry.id);
                }
            }
        }
        tracing::debug!(id = %entry.id, ?previous, "re-dated entry");
    }

    /// Recompute the search text of an entry; ordering is untouched
    pub fn update_entry_search_text(&mut self, entry: &DiaryEntry) {
        self.search_index.set(entry.id.clone(), searchable_text(entry));
    }

    /// Drop an entry from every structure. Removing twice is a no-op.
    pub fn remove_entry(&mut self, id: &str) {
        let position = self.date_index.remove(id);
        // Always attempted so no orphan search text survives
        self.search_index.remove(id);
        tracing::debug!(id, ?position, "removed entry from index");
    }

    /// Insert `entry` into the date index at its searched position.
    /// Returns true if a dangling reference forced a full rebuild.
    fn place<S>(&mut self, store: &S, entry: &DiaryEntry) -> bool
    where
        S: EntryStore + ?Sized,
    {
        let found = self.date_index.search_insert(store, entry.date);

        if found.dangling > 0 {
            self.dangling_lookups += found.dangling as u64;
            tracing::warn!(
                id = %entry.id,
                dangling = found.dangling,
                policy = ?self.config.dangling_policy,
                "date index references entries missing from the store"
            );

            if self.config.dangling_policy == DanglingPolicy::Rebuild {
                self.build_index(store);
                // The store normally holds the entry already
                if !self.date_index.contains(&entry.id) {
                    let index = self.date_index.find_insert_index(store, entry.date);
                    self.date_index
                        .insert_at(index, entry.id.clone(), entry.day_key());
                }
                return true;
            }
        }

        self.date_index
            .insert_at(found.index, entry.id.clone(), entry.day_key());
        false
    }

    // ==================== Lookups ====================

    /// Position a new entry dated `date` would take
    pub fn find_insert_index<S>(&self, store: &S, date: DateTime<Utc>) -> usize
    where
        S: EntryStore + ?Sized,
    {
        self.date_index.find_insert_index(store, date)
    }

    /// Index bounds of all entries whose day lies in `[start_day, end_day]`
    pub fn find_range_by_date_range(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Range<usize> {
        self.date_index.find_range_by_date_range(start_day, end_day)
    }

    /// Identifiers, most recent first
    pub fn ids_by_date_desc(&self) -> &[String] {
        self.date_index.ids()
    }

    /// Day keys parallel to [`ids_by_date_desc`](Self::ids_by_date_desc)
    pub fn day_keys_by_date_desc(&self) -> &[NaiveDate] {
        self.date_index.day_keys()
    }

    /// A page of the date-ordered listing; out-of-range pages are empty
    pub fn page(&self, offset: usize, limit: usize) -> &[String] {
        let ids = self.date_index.ids();
        let start = offset.min(ids.len());
        let end = start.saturating_add(limit).min(ids.len());
        &ids[start..end]
    }

    /// Identifiers whose day lies in `[start_day, end_day]`, most recent first
    pub fn ids_in_range(&self, start_day: NaiveDate, end_day: NaiveDate) -> &[String] {
        self.date_index.ids_in_range(start_day, end_day)
    }

    /// Identifiers whose search text contains `query`, most recent first
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = SearchIndex::normalize_query(query);
        self.date_index
            .ids()
            .iter()
            .filter(|id| self.search_index.matches_normalized(id, &needle))
            .map(String::as_str)
            .collect()
    }

    pub fn date_index(&self) -> &DateIndex {
        &self.date_index
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search_index
    }

    // ==================== Stats ====================

    pub fn stats(&self) -> IndexStats {
        let days = self.date_index.day_keys();
        IndexStats {
            built: self.built,
            entries: self.date_index.len(),
            search_entries: self.search_index.len(),
            rebuilds: self.rebuilds,
            dangling_lookups: self.dangling_lookups,
            newest_day: days.first().copied(),
            oldest_day: days.last().copied(),
        }
    }

    /// Check the date index invariants
    pub fn is_consistent(&self) -> bool {
        self.date_index.is_consistent()
    }
}
