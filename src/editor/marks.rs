//! Bookmark storage for named positions.

use indexmap::IndexMap;

/// A stored position: which document, and where in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Identity of the document the bookmark lives in.
    pub document: String,
    /// Byte offset of the bookmarked position.
    pub offset: usize,
}

impl Bookmark {
    pub fn new(document: impl Into<String>, offset: usize) -> Self {
        Self {
            document: document.into(),
            offset,
        }
    }
}

/// Bookmarks grouped by name: group → bookmark id → position.
///
/// Purely an address book; groups and ids keep insertion order for stable
/// listing. Bookmarks persist for the session and are cleared explicitly.
#[derive(Debug, Clone, Default)]
pub struct BookmarkSet {
    groups: IndexMap<String, IndexMap<String, Bookmark>>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) a bookmark in a group.
    pub fn set(&mut self, group: &str, id: &str, bookmark: Bookmark) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(id.to_string(), bookmark);
    }

    /// Looks up a bookmark.
    pub fn get(&self, group: &str, id: &str) -> Option<&Bookmark> {
        self.groups.get(group)?.get(id)
    }

    /// Removes one bookmark; returns it if it existed.
    pub fn remove(&mut self, group: &str, id: &str) -> Option<Bookmark> {
        self.groups.get_mut(group)?.shift_remove(id)
    }

    /// Clears one group, or every group when `group` is `None`.
    pub fn clear(&mut self, group: Option<&str>) {
        match group {
            Some(name) => {
                self.groups.shift_remove(name);
            }
            None => self.groups.clear(),
        }
    }

    /// Lists a group's bookmarks as (id, bookmark) pairs in insertion order.
    pub fn list(&self, group: &str) -> Vec<(&str, &Bookmark)> {
        self.groups
            .get(group)
            .map(|g| g.iter().map(|(id, bm)| (id.as_str(), bm)).collect())
            .unwrap_or_default()
    }

    /// Offsets of every bookmark in `document`, across all groups.
    pub fn offsets_in(&self, document: &str) -> Vec<usize> {
        self.groups
            .values()
            .flat_map(|g| g.values())
            .filter(|bm| bm.document == document)
            .map(|bm| bm.offset)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut set = BookmarkSet::new();
        set.set("default", "a", Bookmark::new("doc1", 42));
        assert_eq!(set.get("default", "a"), Some(&Bookmark::new("doc1", 42)));
        assert_eq!(set.get("default", "b"), None);
        assert_eq!(set.get("other", "a"), None);
    }

    #[test]
    fn test_replace_keeps_one_entry() {
        let mut set = BookmarkSet::new();
        set.set("default", "a", Bookmark::new("doc1", 1));
        set.set("default", "a", Bookmark::new("doc1", 9));
        assert_eq!(set.list("default").len(), 1);
        assert_eq!(set.get("default", "a").unwrap().offset, 9);
    }

    #[test]
    fn test_clear_group() {
        let mut set = BookmarkSet::new();
        set.set("g1", "a", Bookmark::new("doc", 0));
        set.set("g2", "a", Bookmark::new("doc", 5));
        set.clear(Some("g1"));
        assert!(set.get("g1", "a").is_none());
        assert!(set.get("g2", "a").is_some());
        set.clear(None);
        assert!(set.get("g2", "a").is_none());
    }

    #[test]
    fn test_offsets_in_document() {
        let mut set = BookmarkSet::new();
        set.set("g1", "a", Bookmark::new("doc1", 3));
        set.set("g2", "b", Bookmark::new("doc1", 8));
        set.set("g2", "c", Bookmark::new("doc2", 1));
        let mut offsets = set.offsets_in("doc1");
        offsets.sort();
        assert_eq!(offsets, vec![3, 8]);
    }
}
