//! Error types for bro-engine.
//!
//! This module provides the [`Error`] enum containing every error the walker
//! and the copier pool can surface to their caller, and the [`Result`] type
//! alias.
//!
//! Per-file and per-directory failures are *not* errors at this level: they
//! are logged, recorded in [`WalkStats`](crate::WalkStats) or
//! [`CopyReport`](crate::CopyReport), and the run carries on.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | IO | [`Error::Io`], [`Error::ThreadPool`] |
//! | Validation | [`Error::SourceNotFound`], [`Error::NotADirectory`] |
//! | Partial | [`Error::IncompleteScan`], [`Error::PartialCopy`] |
//! | Pool | [`Error::PoolClosed`], [`Error::WorkerPanicked`] |

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bro-engine operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while walking or copying.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error outside of a single file operation (e.g. spawning a worker)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The walker's thread pool could not be built
    #[error("Failed to build walker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Walk root does not exist
    #[error("Path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Walk root is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// One or more directories could not be scanned
    ///
    /// Only returned under [`ScanErrorPolicy::Fail`](crate::ScanErrorPolicy::Fail).
    /// Files found elsewhere in the tree are still in the collector.
    #[error("{} directories under {root} could not be scanned", dirs.len())]
    IncompleteScan {
        /// Root of the walk
        root: PathBuf,
        /// Directories whose scan was abandoned
        dirs: Vec<PathBuf>,
    },

    /// Failed to copy one or more files
    #[error("Failed to copy {failed} of {total} files")]
    PartialCopy {
        /// Number of files that failed to copy
        failed: usize,
        /// Total number of files submitted
        total: usize,
    },

    /// Every copier worker has exited, so the task cannot be handed off
    #[error("Copier pool has no running workers")]
    PoolClosed,

    /// A copier worker panicked before draining the queue
    #[error("Copier worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker thread
        worker: usize,
    },
}
