//! Configuration options for walking and copying.
//!
//! This module provides [`Options`], shared by the [`Walker`](crate::Walker)
//! and the [`CopierPool`](crate::CopierPool), and [`ScanErrorPolicy`] for
//! directories that cannot be enumerated.
//!
//! # Example
//!
//! ```
//! use bro_engine::{Options, ScanErrorPolicy};
//!
//! let options = Options::default()
//!     .with_parallel(8)
//!     .with_on_scan_error(ScanErrorPolicy::Fail)
//!     .with_max_pending(1024);
//! ```

/// What to do when a directory cannot be enumerated during a walk.
///
/// In every case the directory's remaining entries are skipped and the
/// directory is recorded in [`WalkStats::failed_dirs`](crate::WalkStats::failed_dirs);
/// the rest of the tree is still walked.
///
/// # Default
///
/// The default is [`ScanErrorPolicy::Warn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScanErrorPolicy {
    /// Record the directory and log at debug level only.
    Skip,
    /// Record the directory and emit a warning (default).
    #[default]
    Warn,
    /// Emit a warning, finish the walk, then return
    /// [`Error::IncompleteScan`](crate::Error::IncompleteScan).
    Fail,
}

/// Options for walk and copy operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `parallel` | 16 | Concurrent directory scans / copy workers |
/// | `on_scan_error` | `Warn` | Warn about unreadable directories |
/// | `max_pending` | `None` | No cap on queued traversal tasks |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Concurrency bound applied to both the walker and the copier pool
    /// (default: 16, never less than 1)
    pub parallel: usize,

    /// Behavior when a directory cannot be enumerated
    pub on_scan_error: ScanErrorPolicy,

    /// Maximum number of spawned-but-unfinished traversal tasks
    /// (default: None = unlimited)
    ///
    /// A hard cap: a slot is reserved before a task is spawned. Once all
    /// slots are taken, newly found subdirectories are scanned inline by the
    /// task that found them instead of being queued.
    pub max_pending: Option<usize>,

    /// Callback for warnings (optional)
    ///
    /// If not set, warnings are logged via `tracing::warn!`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parallel: 16,
            on_scan_error: ScanErrorPolicy::Warn,
            max_pending: None,
            warn_handler: None,
        }
    }
}

impl Options {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Set the concurrency bound
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_parallel(mut self, n: usize) -> Self {
        self.parallel = n.max(1);
        self
    }

    /// Set the scan error policy
    #[must_use]
    pub fn with_on_scan_error(mut self, policy: ScanErrorPolicy) -> Self {
        self.on_scan_error = policy;
        self
    }

    /// Cap the number of queued traversal tasks
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_max_pending(mut self, n: usize) -> Self {
        self.max_pending = Some(n.max(1));
        self
    }

    /// Effective concurrency bound, even if `parallel` was set to 0 directly.
    pub(crate) fn bound(&self) -> usize {
        self.parallel.max(1)
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            tracing::warn!("{}", msg);
        }
    }
}
