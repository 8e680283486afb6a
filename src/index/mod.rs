//! Diary Index Structures
//!
//! In-memory acceleration layer in front of the entry store:
//!
//! - **DateIndex**: ids in date-descending order + day keys, binary search
//!   for insertion points and day ranges
//! - **SearchIndex**: id → lower-cased searchable text
//! - **IndexManager**: lazy/eager rebuild and incremental maintenance
//!
//! # Architecture
//!
//! ```text
//! Query: "entries from 2024-03-01 to 2024-03-07"
//!        ↓
//! DateIndex: two binary searches over day keys → ids[4..9]
//!        ↓
//! EntryStore: resolve each id → DiaryEntry
//!
//! Query: "beach"
//!        ↓
//! DateIndex order, filtered by SearchIndex substring match
//! ```

mod date_index;
mod manager;
mod search_index;
mod searchable;

pub use date_index::{DateIndex, InsertPosition};
pub use manager::{DanglingPolicy, IndexConfig, IndexManager};
pub use search_index::SearchIndex;
pub use searchable::searchable_text;

use chrono::NaiveDate;

/// Statistics about the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Whether the index has been built at least once
    pub built: bool,
    /// Number of entries in date order
    pub entries: usize,
    /// Number of entries with search text
    pub search_entries: usize,
    /// Full rebuilds performed
    pub rebuilds: u64,
    /// Dangling references met during insertion searches
    pub dangling_lookups: u64,
    /// Most recent indexed day
    pub newest_day: Option<NaiveDate>,
    /// Oldest indexed day
    pub oldest_day: Option<NaiveDate>,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let day = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        write!(
            f,
            "Entries: {}, Searchable: {}, Rebuilds: {}, Dangling: {}, Days: {} .. {}",
            self.entries,
            self.search_entries,
            self.rebuilds,
            self.dangling_lookups,
            day(self.oldest_day),
            day(self.newest_day)
        )
    }
}
