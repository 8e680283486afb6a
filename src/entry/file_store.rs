//! JSON file entry store
//!
//! Keeps every entry in memory and mirrors the map to a single JSON file.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous file intact.

use crate::entry::store::validate;
use crate::entry::{DiaryEntry, EntryStore, StoreError, StoreResult, WritableStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const STORE_VERSION: u32 = 1;

/// Durable entry store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    entries: HashMap<String, DiaryEntry>,
    path: PathBuf,
    /// Persist after every mutation
    autosave: bool,
    /// Track if modified since last save
    dirty: bool,
}

/// Serialization format for the store file
#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Vec<DiaryEntry>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty one if the file is missing
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened entry store");

        Ok(Self {
            entries,
            path,
            autosave: true,
            dirty: false,
        })
    }

    /// Disable per-mutation persistence; call [`persist`](Self::persist) explicitly
    pub fn without_autosave(mut self) -> Self {
        self.autosave = false;
        self
    }

    fn load_from_file(path: &Path) -> StoreResult<HashMap<String, DiaryEntry>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let data: StoreFile = serde_json::from_reader(reader).map_err(|e| {
            StoreError::Serialization(format!("Failed to load entry store: {}", e))
        })?;

        if data.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(data.version));
        }

        Ok(data
            .entries
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect())
    }

    /// Write the store to disk if it has unsaved changes
    pub fn persist(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Sorted output keeps the file diff-friendly
        let mut entries: Vec<&DiaryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        #[derive(Serialize)]
        struct StoreFileRef<'a> {
            version: u32,
            entries: Vec<&'a DiaryEntry>,
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(
                &mut writer,
                &StoreFileRef {
                    version: STORE_VERSION,
                    entries,
                },
            )
            .map_err(|e| {
                StoreError::Serialization(format!("Failed to persist entry store: {}", e))
            })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "persisted entry store"
        );
        Ok(())
    }

    /// Check if there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get the store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn after_mutation(&mut self) -> StoreResult<()> {
        self.dirty = true;
        if self.autosave {
            self.persist()?;
        }
        Ok(())
    }
}

impl EntryStore for JsonFileStore {
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

impl WritableStore for JsonFileStore {
    fn put(&mut self, entry: DiaryEntry) -> StoreResult<Option<DiaryEntry>> {
        validate(&entry)?;
        let id = entry.id.clone();
        let was_dirty = self.dirty;
        let previous = self.entries.insert(id.clone(), entry);

        if let Err(err) = self.after_mutation() {
            // A failed write leaves the map as it was
            match previous {
                Some(prev) => {
                    self.entries.insert(id, prev);
                }
                None => {
                    self.entries.remove(&id);
                }
            }
            self.dirty = was_dirty;
            return Err(err);
        }
        Ok(previous)
    }

    fn delete(&mut self, id: &str) -> StoreResult<Option<DiaryEntry>> {
        let was_dirty = self.dirty;
        let Some(removed) = self.entries.remove(id) else {
            return Ok(None);
        };

        if let Err(err) = self.after_mutation() {
            self.entries.insert(removed.id.clone(), removed);
            self.dirty = was_dirty;
            return Err(err);
        }
        Ok(Some(removed))
    }
}
