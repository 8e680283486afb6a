//! Search Index - identifier → searchable text
//!
//! One precomputed, lower-cased string per indexed entry. Updated
//! independently of date ordering.
//!
//! # Example
//! ```ignore
//! search_index.set("e1", searchable_text(&entry));
//! let hits = search_index.matching_ids("beach");
//! ```

use std::collections::HashMap;

/// Mapping from entry identifier to its searchable text
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    texts: HashMap<String, String>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the text for an identifier
    pub fn set(&mut self, id: impl Into<String>, text: String) {
        self.texts.insert(id.into(), text);
    }

    /// Remove an identifier, returning its text if it was indexed
    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.texts.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.texts.contains_key(id)
    }

    /// Lower-case a query the same way indexed text is lower-cased
    pub fn normalize_query(query: &str) -> String {
        query.to_lowercase()
    }

    /// Whether the indexed text for `id` contains `query` (case-insensitive)
    pub fn matches(&self, id: &str, query: &str) -> bool {
        self.matches_normalized(id, &Self::normalize_query(query))
    }

    /// Like [`matches`](Self::matches) for a needle already passed through
    /// [`normalize_query`](Self::normalize_query)
    pub(crate) fn matches_normalized(&self, id: &str, needle: &str) -> bool {
        self.texts
            .get(id)
            .map(|text| text.contains(needle))
            .unwrap_or(false)
    }

    /// All identifiers whose text contains `query` (case-insensitive, unordered)
    pub fn matching_ids(&self, query: &str) -> Vec<&str> {
        let needle = Self::normalize_query(query);
        self.texts
            .iter()
            .filter(|(_, text)| text.contains(&needle))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Replace the whole index
    pub(crate) fn replace(&mut self, texts: HashMap<String, String>) {
        self.texts = texts;
    }

    /// Iterate over `(id, text)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.texts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
