//! # Photodiary
//!
//! Diary entry store and index: date-descending listing, day-range lookup
//! and case-insensitive text search over a keyed entry store, kept
//! incrementally consistent as entries are created, edited and deleted.
//!
//! ## Modules
//!
//! - [`entry`]: Diary entries and the stores that own them
//! - [`index`]: Date index, search index and their coordinator
//! - [`diary`]: Service tying a store to its index
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use photodiary::{Diary, DiaryEntry, MemoryStore};
//!
//! let mut diary = Diary::new(MemoryStore::new());
//!
//! let date = Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap();
//! diary
//!     .create(DiaryEntry::new(date, "Beach day").tag("summer").location("Brighton"))
//!     .unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//! assert_eq!(diary.entries_between(day, day).len(), 1);
//! assert_eq!(diary.search("brighton").len(), 1);
//! ```

pub mod config;
pub mod diary;
pub mod entry;
pub mod index;

// Re-export top-level types for convenience
pub use entry::{
    day_key, DiaryEntry, EntryPatch, EntryStore, JsonFileStore, MemoryStore, StoreError,
    StoreResult, WritableStore,
};

pub use index::{
    searchable_text, DanglingPolicy, DateIndex, IndexConfig, IndexManager, IndexStats,
    InsertPosition, SearchIndex,
};

pub use diary::{Diary, DiaryOptions};

pub use config::{
    generate_default_config, Config, ConfigError, IndexSettings, LoggingConfig, StoreConfig,
};
