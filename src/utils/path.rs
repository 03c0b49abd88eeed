//! Path bookkeeping for mirroring trees.
//!
//! Every command that moves files computes a destination by taking a
//! collected path, stripping the root it was collected under, and joining
//! the remainder onto another root. These helpers do that without string
//! prefix tricks, so `/project-old/a` is never mistaken for a child of
//! `/project`.

use std::path::{Path, PathBuf};

/// Re-root `path` from `from` onto `to`.
///
/// Returns `None` if `path` is not inside `from`.
///
/// # Example
///
/// ```
/// use bro_engine::rebase;
/// use std::path::{Path, PathBuf};
///
/// let dst = rebase(
///     Path::new("/project/src/main.rs"),
///     Path::new("/project"),
///     Path::new("/project/.bro/_stage"),
/// );
/// assert_eq!(dst, Some(PathBuf::from("/project/.bro/_stage/src/main.rs")));
/// ```
#[must_use]
pub fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    path.strip_prefix(from).ok().map(|rel| to.join(rel))
}

/// Whether `path` is `root` or lies underneath it (component-wise).
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
