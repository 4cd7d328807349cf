//! The in-memory file catalog.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::record::MediaRecord;

/// Ordered, mutable collection of tracked files; the single source of
/// truth for what the user currently has loaded.
///
/// Records are keyed by absolute path (no two records share one) and kept
/// in insertion order. That order is the display order and the
/// deterministic tie-break for deletion survivor selection, so removal
/// uses `shift_remove` to preserve it.
#[derive(Debug, Default)]
pub struct FileCatalog {
    records: IndexMap<PathBuf, MediaRecord>,
}

impl FileCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` (and leaves the catalog unchanged)
    /// when a record with the same path is already present.
    pub fn add(&mut self, record: MediaRecord) -> bool {
        if self.records.contains_key(&record.path) {
            return false;
        }
        self.records.insert(record.path.clone(), record);
        true
    }

    /// Remove the record for `path`, preserving the order of the rest.
    pub fn remove(&mut self, path: &Path) -> Option<MediaRecord> {
        self.records.shift_remove(path)
    }

    /// Drop every record. No filesystem effect.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if a path is already tracked.
    pub fn contains(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    /// Look up a record by path.
    pub fn get(&self, path: &Path) -> Option<&MediaRecord> {
        self.records.get(path)
    }

    /// Look up a record by path for mutation.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut MediaRecord> {
        self.records.get_mut(path)
    }

    /// Find the first record whose file name matches `name`, in catalog order.
    pub fn find_by_name(&self, name: &str) -> Option<&MediaRecord> {
        self.records.values().find(|r| r.name == name)
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaRecord> {
        self.records.values()
    }

    /// Iterate records mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MediaRecord> {
        self.records.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MediaKind;

    fn rec(path: &str, size: u64) -> MediaRecord {
        MediaRecord::new(path, MediaKind::Image, size, None)
    }

    #[test]
    fn test_add_rejects_duplicate_paths() {
        let mut catalog = FileCatalog::new();
        assert!(catalog.add(rec("/a/x.jpg", 10)));
        assert!(!catalog.add(rec("/a/x.jpg", 20)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(Path::new("/a/x.jpg")).unwrap().size, 10);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut catalog = FileCatalog::new();
        catalog.add(rec("/a.jpg", 1));
        catalog.add(rec("/b.jpg", 2));
        catalog.add(rec("/c.jpg", 3));

        catalog.remove(Path::new("/b.jpg"));

        let names: Vec<_> = catalog.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let mut catalog = FileCatalog::new();
        catalog.add(rec("/one/x.jpg", 1));
        catalog.add(rec("/two/x.jpg", 2));

        let found = catalog.find_by_name("x.jpg").unwrap();
        assert_eq!(found.path, Path::new("/one/x.jpg"));
    }

    #[test]
    fn test_clear() {
        let mut catalog = FileCatalog::new();
        catalog.add(rec("/a.jpg", 1));
        catalog.clear();
        assert!(catalog.is_empty());
    }
}
