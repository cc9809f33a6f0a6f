use std::collections::BTreeMap;

use crate::canonical_path;

/// Per-path breadcrumb titles announced by views, taking precedence over the
/// route table.
///
/// Paths are keyed by their canonical form, so `/forum/`, `/forum?page=2`
/// and `/forum` name the same entry.
///
/// Writes are change-checked: `revision` only advances when a stored title
/// actually changes, so a reactive consumer can skip redundant work.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideRegistry {
    titles: BTreeMap<String, String>,
    revision: u64,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.titles.get(&canonical_path(path)).map(String::as_str)
    }

    /// Stores `title` for `path`. Empty titles are ignored. Returns whether
    /// anything changed.
    pub fn set(&mut self, path: impl Into<String>, title: impl Into<String>) -> bool {
        let title = title.into();
        if title.is_empty() {
            return false;
        }
        let path = canonical_path(&path.into());
        if self.titles.get(&path) == Some(&title) {
            return false;
        }
        self.titles.insert(path, title);
        self.revision += 1;
        true
    }

    /// Removes the title for `path`; absent paths are a no-op.
    pub fn clear(&mut self, path: &str) -> bool {
        if self.titles.remove(&canonical_path(path)).is_none() {
            return false;
        }
        self.revision += 1;
        true
    }

    /// Removes the title for `path` only while it still equals `title`.
    pub fn clear_if(&mut self, path: &str, title: &str) -> bool {
        if self.get(path) != Some(title) {
            return false;
        }
        self.clear(path)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
