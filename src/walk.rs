//! Bounded parallel directory walker.
//!
//! Every directory is scanned by its own task. A task lists only the
//! directory's direct entries: regular files go into the shared
//! [`FileSet`], subdirectories become new tasks. Tasks run on a rayon pool
//! with exactly `parallel` threads, so at most that many directories are
//! being listed at once, while the scope around the walk is the join
//! barrier that keeps [`Walker::walk_and_collect`] blocked until the last
//! task has finished.

use crate::error::{Error, Result};
use crate::file_set::FileSet;
use crate::options::{Options, ScanErrorPolicy};
use rayon::Scope;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Statistics from a walk.
///
/// Returned by [`Walker::walk_and_collect`]. A walk that hit unreadable
/// directories still returns stats (unless the policy is
/// [`ScanErrorPolicy::Fail`]); check [`failed_dirs`](Self::failed_dirs)
/// before assuming the collected set is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Number of paths newly inserted into the collector
    pub files_found: u64,
    /// Number of directories visited, including ones whose scan failed
    pub dirs_scanned: u64,
    /// Directories whose scan was abandoned, sorted
    pub failed_dirs: Vec<PathBuf>,
    /// Highest number of directories being listed at the same time
    pub peak_scanning: usize,
    /// Highest number of traversal tasks outstanding at the same time
    pub peak_pending: usize,
    /// Duration of the walk
    pub duration: Duration,
}

impl WalkStats {
    /// Whether every directory in the tree was scanned to the end
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_dirs.is_empty()
    }
}

/// Parallel recursive file collector with a fixed concurrency bound.
///
/// # Example
///
/// ```no_run
/// use bro_engine::{FileSet, Walker};
/// use std::path::Path;
///
/// let files = FileSet::new();
/// let stats = Walker::new(16).walk_and_collect(Path::new("project"), &files)?;
/// println!("found {} files in {} directories", files.len(), stats.dirs_scanned);
/// # Ok::<(), bro_engine::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Walker {
    options: Options,
}

impl Walker {
    /// Create a walker that scans at most `parallel` directories at once
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn new(parallel: usize) -> Self {
        Self::with_options(Options::default().with_parallel(parallel))
    }

    /// Create a walker from full options
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Options this walker was built with
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Insert every regular file under `root` into `files`.
    ///
    /// Blocks until the whole tree has been walked; once this returns no
    /// further inserts happen. Paths are absolute: a relative `root` is
    /// resolved against the current directory first. Directories are only
    /// recursed into, and symlinks and special files are skipped without
    /// being followed.
    ///
    /// A directory that cannot be listed has its remaining entries skipped
    /// and is recorded in [`WalkStats::failed_dirs`]; the rest of the tree is
    /// unaffected.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `root` does not exist ([`Error::SourceNotFound`])
    /// - `root` is not a directory ([`Error::NotADirectory`])
    /// - the thread pool cannot be built ([`Error::ThreadPool`])
    /// - some directory failed to scan and the policy is
    ///   [`ScanErrorPolicy::Fail`] ([`Error::IncompleteScan`])
    pub fn walk_and_collect(&self, root: &Path, files: &FileSet) -> Result<WalkStats> {
        let start_time = Instant::now();
        let root = resolve_root(root)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.bound())
            .thread_name(|i| format!("bro-walk-{i}"))
            .build()?;

        let state = WalkState::new(files, &self.options);
        // An empty walk always has room for the root task
        if state.try_reserve() {
            pool.scope(|scope| spawn_visit(scope, &state, root.clone()));
        }
        debug_assert_eq!(state.pending.load(Ordering::Acquire), 0);

        self.finish(root, state, start_time)
    }

    /// Turn the settled state of a walk into its stats, applying the scan
    /// error policy.
    fn finish(
        &self,
        root: PathBuf,
        state: WalkState<'_>,
        start_time: Instant,
    ) -> Result<WalkStats> {
        let mut stats = state.into_stats();
        stats.duration = start_time.elapsed();

        tracing::debug!(
            root = %root.display(),
            files = stats.files_found,
            dirs = stats.dirs_scanned,
            failed = stats.failed_dirs.len(),
            peak = stats.peak_scanning,
            peak_pending = stats.peak_pending,
            elapsed = ?stats.duration,
            "walk finished"
        );

        if self.options.on_scan_error == ScanErrorPolicy::Fail && !stats.is_complete() {
            return Err(Error::IncompleteScan {
                root,
                dirs: stats.failed_dirs,
            });
        }

        Ok(stats)
    }

    /// Walk `root` into a fresh [`FileSet`].
    ///
    /// # Errors
    ///
    /// Same as [`walk_and_collect`](Self::walk_and_collect).
    pub fn collect(&self, root: &Path) -> Result<(FileSet, WalkStats)> {
        let files = FileSet::new();
        let stats = self.walk_and_collect(root, &files)?;
        Ok((files, stats))
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(root.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    Ok(std::path::absolute(root)?)
}

/// State shared by every task of one walk.
struct WalkState<'a> {
    files: &'a FileSet,
    options: &'a Options,
    /// Spawned tasks that have not finished yet
    pending: AtomicUsize,
    peak_pending: AtomicUsize,
    scanning: AtomicUsize,
    peak_scanning: AtomicUsize,
    files_found: AtomicU64,
    dirs_scanned: AtomicU64,
    failed_dirs: Mutex<Vec<PathBuf>>,
}

impl<'a> WalkState<'a> {
    fn new(files: &'a FileSet, options: &'a Options) -> Self {
        Self {
            files,
            options,
            pending: AtomicUsize::new(0),
            peak_pending: AtomicUsize::new(0),
            scanning: AtomicUsize::new(0),
            peak_scanning: AtomicUsize::new(0),
            files_found: AtomicU64::new(0),
            dirs_scanned: AtomicU64::new(0),
            failed_dirs: Mutex::new(Vec::new()),
        }
    }

    fn enter_scan(&self) -> ScanGuard<'_> {
        let now = self.scanning.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_scanning.fetch_max(now, Ordering::AcqRel);
        ScanGuard {
            scanning: &self.scanning,
        }
    }

    /// Claim a slot for a new traversal task, failing when `max_pending`
    /// tasks are already outstanding.
    fn try_reserve(&self) -> bool {
        let reserved = match self.options.max_pending {
            None => Ok(self.pending.fetch_add(1, Ordering::AcqRel)),
            Some(max) => self
                .pending
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < max).then_some(n + 1)
                }),
        };
        match reserved {
            Ok(previous) => {
                self.peak_pending.fetch_max(previous + 1, Ordering::AcqRel);
                true
            }
            Err(_) => false,
        }
    }

    fn scan_failed(&self, dir: &Path, error: &io::Error) {
        match self.options.on_scan_error {
            ScanErrorPolicy::Skip => {
                tracing::debug!(dir = %dir.display(), %error, "directory scan abandoned");
            }
            ScanErrorPolicy::Warn | ScanErrorPolicy::Fail => {
                self.options
                    .warn(&format!("Failed to scan {}: {}", dir.display(), error));
            }
        }
        self.failed_dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dir.to_path_buf());
    }

    fn into_stats(self) -> WalkStats {
        let mut failed_dirs = self
            .failed_dirs
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        failed_dirs.sort();

        WalkStats {
            files_found: self.files_found.into_inner(),
            dirs_scanned: self.dirs_scanned.into_inner(),
            failed_dirs,
            peak_scanning: self.peak_scanning.into_inner(),
            peak_pending: self.peak_pending.into_inner(),
            duration: Duration::ZERO,
        }
    }
}

/// Held while a task is listing a directory.
struct ScanGuard<'a> {
    scanning: &'a AtomicUsize,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.scanning.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Spawn a traversal task for `dir` on a slot already counted in `pending`.
fn spawn_visit<'scope>(scope: &Scope<'scope>, state: &'scope WalkState<'_>, dir: PathBuf) {
    scope.spawn(move |scope| {
        {
            let _guard = state.enter_scan();
            scan_dir(scope, state, &dir);
        }
        state.pending.fetch_sub(1, Ordering::AcqRel);
    });
}

/// List the direct entries of `dir`, handing subdirectories off as new tasks.
///
/// Any enumeration error abandons the rest of this directory.
fn scan_dir<'scope>(scope: &Scope<'scope>, state: &'scope WalkState<'_>, dir: &Path) {
    state.dirs_scanned.fetch_add(1, Ordering::Relaxed);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return state.scan_failed(dir, &e),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return state.scan_failed(dir, &e),
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => return state.scan_failed(dir, &e),
        };
        let path = entry.path();

        if file_type.is_dir() {
            if state.try_reserve() {
                spawn_visit(scope, state, path);
            } else {
                scan_dir(scope, state, &path);
            }
        } else if file_type.is_file() {
            if state.files.insert(path) {
                state.files_found.fetch_add(1, Ordering::Relaxed);
            }
        } else {
            tracing::trace!(path = %path.display(), "skipping non-regular entry");
        }
    }
}
