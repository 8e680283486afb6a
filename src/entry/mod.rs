//! Diary entries and the stores that own them
//!
//! - **types**: `DiaryEntry` and `EntryPatch`
//! - **store**: `EntryStore` / `WritableStore` traits, `MemoryStore`
//! - **file_store**: `JsonFileStore`, the durable store used by the CLI
//! - **error**: Error types

pub mod error;
pub mod file_store;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use file_store::JsonFileStore;
pub use store::{EntryStore, MemoryStore, WritableStore};
pub use types::{day_key, DiaryEntry, EntryPatch};
