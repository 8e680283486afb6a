//! Searchable text builder
//!
//! Flattens an entry's textual fields into one lower-cased string. Search is
//! a literal substring match against it, so no tokenizing or stemming.

use crate::entry::DiaryEntry;

/// Build the normalized search string for an entry
///
/// Title, content, space-joined tags and location (empty if absent),
/// separated by single spaces and lower-cased.
pub fn searchable_text(entry: &DiaryEntry) -> String {
    let location = entry.location.as_deref().unwrap_or("");
    format!(
        "{} {} {} {}",
        entry.title,
        entry.content,
        entry.tags.join(" "),
        location
    )
    .to_lowercase()
}
