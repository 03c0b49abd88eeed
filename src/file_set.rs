//! Concurrent set of collected file paths.

use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// A set of file paths that many threads can insert into at once.
///
/// The [`Walker`](crate::Walker) fills it from every traversal task; once
/// [`walk_and_collect`](crate::Walker::walk_and_collect) returns, the set is
/// stable and can be read by a single consumer. Insertion order is not
/// preserved, so readers that need a stable order should use
/// [`to_sorted_vec`](Self::to_sorted_vec).
///
/// # Example
///
/// ```
/// use bro_engine::FileSet;
/// use std::path::Path;
///
/// let files = FileSet::new();
/// assert!(files.insert("/project/a.txt"));
/// assert!(!files.insert("/project/a.txt"));
/// assert!(files.contains(Path::new("/project/a.txt")));
/// assert_eq!(files.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FileSet {
    paths: DashSet<PathBuf>,
}

impl FileSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path, returning `true` if it was not already present
    pub fn insert(&self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    /// Check whether a path is in the set
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Number of paths in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Snapshot of the set, sorted
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.paths.iter().map(|p| p.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Consume the set, returning its paths sorted
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.paths.into_iter().collect();
        paths.sort();
        paths
    }
}

impl FromIterator<PathBuf> for FileSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
