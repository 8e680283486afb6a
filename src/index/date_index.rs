//! Date Index - entry identifiers in date-descending order
//!
//! Two parallel sequences, `ids` and `day_keys`, where position i of both
//! describes the same entry. Day keys are non-increasing; entries with the
//! same timestamp keep insertion order.
//!
//! # Performance
//! - Insertion point: O(log n) store lookups (full-precision dates)
//! - Day range: O(log n) over the day keys, no store access
//! - Position of an id: O(1) via the position map
//! - Insert/remove: O(n) element shifting, same as the underlying `Vec`

use crate::entry::EntryStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::ops::Range;

/// Result of an insertion-point search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPosition {
    /// Where the new entry goes
    pub index: usize,
    /// Candidates visited whose id no longer resolved in the store
    pub dangling: usize,
}

/// Date-ordered identifier index
#[derive(Debug, Default, Clone)]
pub struct DateIndex {
    ids: Vec<String>,
    day_keys: Vec<NaiveDate>,
    /// id → current position in `ids`
    positions: HashMap<String, usize>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers, most recent first
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Day keys, parallel to [`ids`](Self::ids)
    pub fn day_keys(&self) -> &[NaiveDate] {
        &self.day_keys
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Current position of an identifier
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    // ==================== Lookups ====================

    /// Position at which an entry dated `date` keeps the order non-increasing
    ///
    /// Compares against the full stored date of each candidate. An equal
    /// timestamp is passed over, so the new entry lands after every existing
    /// entry with the same timestamp. A candidate missing from the store is
    /// treated as older than any date and the search narrows to the left.
    pub fn find_insert_index<S>(&self, store: &S, date: DateTime<Utc>) -> usize
    where
        S: EntryStore + ?Sized,
    {
        self.search_insert(store, date).index
    }

    /// Like [`find_insert_index`](Self::find_insert_index) but also reports
    /// how many dangling references were visited
    pub fn search_insert<S>(&self, store: &S, date: DateTime<Utc>) -> InsertPosition
    where
        S: EntryStore + ?Sized,
    {
        let mut low = 0;
        let mut high = self.ids.len();
        let mut dangling = 0;

        while low < high {
            let mid = low + (high - low) / 2;
            match store.get(&self.ids[mid]) {
                Some(existing) if date > existing.date => high = mid,
                Some(_) => low = mid + 1,
                None => {
                    dangling += 1;
                    high = mid;
                }
            }
        }

        InsertPosition {
            index: low,
            dangling,
        }
    }

    /// Index bounds of every entry whose day lies in `[start_day, end_day]`
    ///
    /// Returns an empty range when nothing matches (including
    /// `start_day > end_day` and the empty index).
    pub fn find_range_by_date_range(
        &self,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> Range<usize> {
        // Newer boundary: first day key not after end_day
        let start = self.day_keys.partition_point(|key| *key > end_day);
        // Older boundary (exclusive): first day key before start_day
        let end = start + self.day_keys[start..].partition_point(|key| *key >= start_day);
        start..end
    }

    /// Identifiers whose day lies in `[start_day, end_day]`, most recent first
    pub fn ids_in_range(&self, start_day: NaiveDate, end_day: NaiveDate) -> &[String] {
        &self.ids[self.find_range_by_date_range(start_day, end_day)]
    }

    // ==================== Mutation ====================

    /// Insert `id` at `index` in both sequences
    ///
    /// `index` is clamped to the current length. The caller must make sure
    /// `id` is not already present.
    pub(crate) fn insert_at(&mut self, index: usize, id: String, day_key: NaiveDate) {
        debug_assert!(!self.positions.contains_key(&id), "duplicate id in date index");
        let index = index.min(self.ids.len());

        // Allocate for both sequences before touching either
        self.ids.reserve(1);
        self.day_keys.reserve(1);
        self.positions.reserve(1);

        self.ids.insert(index, id.clone());
        self.day_keys.insert(index, day_key);
        self.positions.insert(id, index);
        self.reindex_from(index + 1);
    }

    /// Remove `id` from both sequences, returning its former position
    pub(crate) fn remove(&mut self, id: &str) -> Option<usize> {
        let index = self.positions.remove(id)?;
        self.ids.remove(index);
        self.day_keys.remove(index);
        self.reindex_from(index);
        Some(index)
    }

    /// Replace the whole index with an already sorted sequence
    pub(crate) fn replace(&mut self, sorted: Vec<(String, NaiveDate)>) {
        let (ids, day_keys): (Vec<String>, Vec<NaiveDate>) = sorted.into_iter().unzip();
        self.positions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.ids = ids;
        self.day_keys = day_keys;
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.day_keys.clear();
        self.positions.clear();
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, id) in self.ids[start..].iter().enumerate() {
            if let Some(pos) = self.positions.get_mut(id) {
                *pos = start + offset;
            }
        }
    }

    /// Check the structural invariants: equal lengths, non-increasing day
    /// keys and a position map that agrees with the sequence
    pub fn is_consistent(&self) -> bool {
        self.ids.len() == self.day_keys.len()
            && self.positions.len() == self.ids.len()
            && self.day_keys.windows(2).all(|w| w[0] >= w[1])
            && self
                .ids
                .iter()
                .enumerate()
                .all(|(i, id)| self.positions.get(id) == Some(&i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{DiaryEntry, MemoryStore, WritableStore};
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    /// Store + index populated by inserting at the searched position
    fn populate(dates: &[(&str, DateTime<Utc>)]) -> (MemoryStore, DateIndex) {
        let mut store = MemoryStore::new();
        let mut index = DateIndex::new();
        for (id, date) in dates {
            let pos = index.find_insert_index(&store, *date);
            store.put(DiaryEntry::with_id(*id, *date, *id)).unwrap();
            index.insert_at(pos, id.to_string(), date.date_naive());
        }
        (store, index)
    }

    #[test]
    fn test_empty_index() {
        let index = DateIndex::new();
        let store = MemoryStore::new();

        assert_eq!(index.find_insert_index(&store, at(2024, 1, 1, 0)), 0);
        assert_eq!(index.find_range_by_date_range(day(2024, 1, 1), day(2024, 12, 31)), 0..0);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_insert_keeps_descending_order() {
        let (_, index) = populate(&[
            ("a", at(2024, 3, 10, 0)),
            ("b", at(2024, 3, 12, 0)),
            ("c", at(2024, 3, 11, 0)),
        ]);

        assert_eq!(index.ids(), &["b", "c", "a"]);
        assert_eq!(index.day_keys(), &[day(2024, 3, 12), day(2024, 3, 11), day(2024, 3, 10)]);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_equal_timestamp_lands_after() {
        let (_, index) = populate(&[
            ("a", at(2024, 3, 10, 9)),
            ("b", at(2024, 3, 10, 9)),
            ("c", at(2024, 3, 10, 9)),
        ]);

        assert_eq!(index.ids(), &["a", "b", "c"]);
    }

    #[test]
    fn test_same_day_ordered_by_time() {
        let (_, index) = populate(&[
            ("morning", at(2024, 3, 10, 8)),
            ("evening", at(2024, 3, 10, 20)),
            ("noon", at(2024, 3, 10, 12)),
        ]);

        assert_eq!(index.ids(), &["evening", "noon", "morning"]);
    }

    #[test]
    fn test_range_lookup() {
        let (_, index) = populate(&[
            ("jan1", at(2024, 1, 1, 0)),
            ("jan3a", at(2024, 1, 3, 0)),
            ("jan3b", at(2024, 1, 3, 5)),
            ("jan5", at(2024, 1, 5, 0)),
        ]);

        let range = index.find_range_by_date_range(day(2024, 1, 2), day(2024, 1, 4));
        assert_eq!(range, 1..3);

        let mut ids = index.ids_in_range(day(2024, 1, 2), day(2024, 1, 4)).to_vec();
        ids.sort();
        assert_eq!(ids, vec!["jan3a", "jan3b"]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let (_, index) = populate(&[
            ("jan1", at(2024, 1, 1, 23)),
            ("jan3", at(2024, 1, 3, 0)),
            ("jan5", at(2024, 1, 5, 12)),
        ]);

        assert_eq!(index.find_range_by_date_range(day(2024, 1, 1), day(2024, 1, 5)), 0..3);
        assert_eq!(index.find_range_by_date_range(day(2024, 1, 5), day(2024, 1, 5)), 0..1);
        assert_eq!(index.find_range_by_date_range(day(2024, 1, 1), day(2024, 1, 1)), 2..3);
    }

    #[test]
    fn test_range_with_no_matches_is_empty() {
        let (_, index) = populate(&[("jan1", at(2024, 1, 1, 0)), ("jan5", at(2024, 1, 5, 0))]);

        assert!(index.find_range_by_date_range(day(2024, 1, 2), day(2024, 1, 4)).is_empty());
        assert!(index.find_range_by_date_range(day(2025, 1, 1), day(2025, 2, 1)).is_empty());
        assert!(index.find_range_by_date_range(day(2023, 1, 1), day(2023, 2, 1)).is_empty());
        // Inverted range
        assert!(index.find_range_by_date_range(day(2024, 1, 5), day(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_dangling_reference_narrows_left() {
        let (mut store, index) = populate(&[
            ("a", at(2024, 3, 12, 0)),
            ("b", at(2024, 3, 11, 0)),
            ("c", at(2024, 3, 10, 0)),
        ]);
        store.delete("b").unwrap();

        // "b" sits at the midpoint; the search moves left of it
        let pos = index.search_insert(&store, at(2024, 3, 9, 0));
        assert_eq!(pos.dangling, 1);
        assert_eq!(pos.index, 1);

        let pos = index.search_insert(&store, at(2024, 3, 13, 0));
        assert_eq!(pos, InsertPosition { index: 0, dangling: 1 });

        let pos = index.search_insert(&store, at(2024, 3, 11, 12));
        assert_eq!(pos.index, 1);
    }

    #[test]
    fn test_remove_updates_positions() {
        let (_, mut index) = populate(&[
            ("a", at(2024, 3, 12, 0)),
            ("b", at(2024, 3, 11, 0)),
            ("c", at(2024, 3, 10, 0)),
        ]);

        assert_eq!(index.remove("a"), Some(0));
        assert_eq!(index.remove("a"), None);
        assert_eq!(index.position("b"), Some(0));
        assert_eq!(index.position("c"), Some(1));
        assert!(index.is_consistent());
    }

    #[test]
    fn test_replace_and_clear() {
        let mut index = DateIndex::new();
        index.replace(vec![
            ("x".to_string(), day(2024, 2, 2)),
            ("y".to_string(), day(2024, 2, 1)),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.position("y"), Some(1));
        assert!(index.is_consistent());

        index.clear();
        assert!(index.is_empty());
        assert!(!index.contains("x"));
    }
}
