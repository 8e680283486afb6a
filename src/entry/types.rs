//! Core data types for diary entries
//!
//! - `DiaryEntry`: one diary page (title, body, tags, location, photos)
//! - `EntryPatch`: a partial edit applied to an existing entry

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single diary entry
///
/// Owned by the entry store. The index only ever reads `id`, `date` and the
/// fields that feed the searchable text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    /// Unique identifier, the join key between store and index
    pub id: String,
    /// When the diary entry happened (not when it was written)
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub content: String,
    /// Effective tags in display order
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Paths of attached photos
    #[serde(default)]
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Create an entry with a fresh random identifier
    pub fn new(date: DateTime<Utc>, title: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), date, title)
    }

    /// Create an entry with a caller-chosen identifier
    pub fn with_id(id: impl Into<String>, date: DateTime<Utc>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            date,
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            location: None,
            photos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set body text
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: add a tag (ignored if already present)
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Builder: add multiple tags
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for tag in tags {
            self = self.tag(tag);
        }
        self
    }

    /// Builder: set location
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: attach a photo
    pub fn photo(mut self, path: impl Into<String>) -> Self {
        self.photos.push(path.into());
        self
    }

    /// Calendar day (UTC) of this entry, with time-of-day discarded
    pub fn day_key(&self) -> NaiveDate {
        day_key(self.date)
    }

    /// Check whether the entry carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Truncate a timestamp to its UTC calendar day
pub fn day_key(date: DateTime<Utc>) -> NaiveDate {
    date.date_naive()
}

/// Partial edit of an entry. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub date: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the location
    pub location: Option<Option<String>>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether applying this patch changes the entry's date
    pub fn changes_date(&self, entry: &DiaryEntry) -> bool {
        self.date.map(|d| d != entry.date).unwrap_or(false)
    }

    /// Whether applying this patch changes any field that feeds search text
    pub fn changes_text(&self, entry: &DiaryEntry) -> bool {
        self.title.as_ref().is_some_and(|t| *t != entry.title)
            || self.content.as_ref().is_some_and(|c| *c != entry.content)
            || self.tags.as_ref().is_some_and(|t| *t != entry.tags)
            || self.location.as_ref().is_some_and(|l| *l != entry.location)
    }

    /// Apply the patch, bumping `updated_at`
    pub fn apply(self, entry: &mut DiaryEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(content) = self.content {
            entry.content = content;
        }
        if let Some(tags) = self.tags {
            entry.tags.clear();
            for tag in tags {
                if !entry.tags.contains(&tag) {
                    entry.tags.push(tag);
                }
            }
        }
        if let Some(location) = self.location {
            entry.location = location;
        }
        entry.updated_at = Utc::now();
    }
}
