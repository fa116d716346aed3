//! Ordered entry collection
//!
//! Titles are unique ignoring case and surrounding whitespace. The
//! collection is what a document serializes: `{ "entries": [...] }`.

use serde::{Deserialize, Serialize};

use super::entry::Entry;
use crate::error::{KeycaskError, KeycaskResult};

/// Entries of one document, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryCollection {
    entries: Vec<Entry>,
}

/// Serialized shape, before title uniqueness has been checked
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCollection {
    #[serde(default)]
    entries: Vec<Entry>,
}

impl RawCollection {
    pub(crate) fn into_collection(self) -> KeycaskResult<EntryCollection> {
        EntryCollection::try_from_entries(self.entries)
    }
}

impl EntryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from stored entries
    ///
    /// Titles must be non-blank and unique. Other entry rules only apply to
    /// new and retitled entries, so older data always loads.
    pub fn try_from_entries(entries: Vec<Entry>) -> KeycaskResult<Self> {
        let mut collection = Self::new();
        for entry in entries {
            entry
                .validate_title_present()
                .map_err(|e| KeycaskError::Validation(e.to_string()))?;
            collection.push_unique(entry)?;
        }
        Ok(collection)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// All titles, in insertion order
    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }

    /// Find an entry by title (case-insensitive)
    pub fn get_by_title(&self, title: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.matches_title(title))
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.matches_title(title))
    }

    fn require_position(&self, title: &str) -> KeycaskResult<usize> {
        self.position(title)
            .ok_or_else(|| KeycaskError::entry_not_found(title))
    }

    /// Entries whose title contains `query`, ignoring case
    ///
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.title_contains(query))
            .collect()
    }

    /// Add a new entry
    pub fn add(&mut self, entry: Entry) -> KeycaskResult<()> {
        entry
            .validate()
            .map_err(|e| KeycaskError::Validation(e.to_string()))?;
        self.push_unique(entry)
    }

    fn push_unique(&mut self, entry: Entry) -> KeycaskResult<()> {
        if self.position(&entry.title).is_some() {
            return Err(KeycaskError::duplicate_entry(entry.title));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Apply `edit` to the entry titled `title`
    ///
    /// A changed title is checked like a new entry's before the edit
    /// replaces the old one, so a failed edit leaves the collection
    /// unchanged. The modification time is refreshed.
    pub fn update<F>(&mut self, title: &str, edit: F) -> KeycaskResult<&Entry>
    where
        F: FnOnce(&mut Entry),
    {
        let index = self.require_position(title)?;

        let mut edited = self.entries[index].clone();
        edit(&mut edited);
        edited.touch();
        if edited.title != self.entries[index].title {
            edited
                .validate()
                .map_err(|e| KeycaskError::Validation(e.to_string()))?;
        }

        if let Some(other) = self.position(&edited.title) {
            if other != index {
                return Err(KeycaskError::duplicate_entry(edited.title));
            }
        }

        self.entries[index] = edited;
        Ok(&self.entries[index])
    }

    /// Change an entry's title
    pub fn rename(&mut self, title: &str, new_title: &str) -> KeycaskResult<()> {
        self.update(title, |e| e.title = new_title.to_string())?;
        Ok(())
    }

    /// Copy the entry titled `title` to a new entry titled `new_title`
    pub fn duplicate(&mut self, title: &str, new_title: &str) -> KeycaskResult<&Entry> {
        let index = self.require_position(title)?;
        let copy = self.entries[index].duplicate(new_title);
        self.add(copy)?;
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove and return the entry titled `title`
    pub fn remove(&mut self, title: &str) -> KeycaskResult<Entry> {
        let index = self.require_position(title)?;
        Ok(self.entries.remove(index))
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
