//! ``src/model/selection.rs``
//! ============================================================================
//! # Selection & Filter
//!
//! `SelectionSet` tracks which entries are checked; `NameFilter` holds the
//! search box text. The visible subset is always derived, never stored.

use compact_str::CompactString;
use indexmap::IndexSet;

use crate::model::file_entry::FileEntry;

/// Ids of checked entries, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: IndexSet<CompactString>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns true when `id` is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(CompactString::new(id));
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompactString> {
        self.ids.iter()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Case-insensitive substring filter over entry names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    text: String,
    needle: String,
}

impl NameFilter {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let needle = text.to_lowercase();

        Self { text, needle }
    }

    /// Replace the active filter text.
    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.needle.is_empty() || name.to_lowercase().contains(&self.needle)
    }
}

/// Entries whose name contains the filter text, ignoring case, in their
/// original order. An empty filter keeps everything.
#[must_use]
pub fn visible_entries<'a>(entries: &'a [FileEntry], filter: &NameFilter) -> Vec<&'a FileEntry> {
    entries.iter().filter(|e| filter.matches(&e.name)).collect()
}
