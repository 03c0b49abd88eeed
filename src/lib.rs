//! # bro-engine
//!
//! Bounded-concurrency file collection and file copying for the `bro`
//! scaffolding tool.
//!
//! ## Core Features
//!
//! - **Bounded parallel walk**: one task per directory, at most N directories
//!   listed at once, with a join barrier so results are stable on return
//! - **Concurrent file set**: sharded set that many traversal tasks insert into
//! - **Persistent copier pool**: N worker threads fed through a zero-capacity
//!   hand-off, so producers never run ahead of the workers
//! - **Isolated failures**: an unreadable directory or a failed copy is logged
//!   and recorded, never aborts the rest of the run
//! - **Explicit scan error policy**: skip, warn, or fail on unreadable
//!   directories ([`ScanErrorPolicy`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use bro_engine::{CopierPool, Walker, rebase};
//! use std::path::Path;
//!
//! let root = Path::new("/project");
//! let stage = Path::new("/project/.bro/_stage");
//!
//! // Collect every file under the project
//! let (files, _stats) = Walker::new(16).collect(root)?;
//!
//! // Mirror them into the stage
//! let pool = CopierPool::new(16).start()?;
//! for src in files.into_sorted_vec() {
//!     if let Some(dst) = rebase(&src, root, stage) {
//!         pool.copy(src, dst)?;
//!     }
//! }
//! let report = pool.wait()?;
//! println!("copied {}, failed {}", report.files_copied, report.failures.len());
//! # Ok::<(), bro_engine::Error>(())
//! ```
//!
//! ## Shared Options
//!
//! ```no_run
//! use bro_engine::{CopierPool, Options, ScanErrorPolicy, Walker};
//!
//! let options = Options::default()
//!     .with_parallel(8)
//!     .with_on_scan_error(ScanErrorPolicy::Fail);
//!
//! let walker = Walker::with_options(options.clone());
//! let pool = CopierPool::with_options(&options);
//! ```
//!
//! ## What Is Not Guaranteed
//!
//! A completed walk or pool run does not imply zero errors. Check
//! [`WalkStats::failed_dirs`] and [`CopyReport::failures`]. Copies are not
//! atomic: a destination may be left truncated if its write fails midway.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `serde` | Serialize/Deserialize for [`Options`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod copy;
mod error;
mod file_set;
mod options;
mod utils;
mod walk;

#[cfg(feature = "progress")]
mod progress;

pub use copy::{CopierPool, CopyFailure, CopyReport, CopyStage, CopyTask, RunningPool};
pub use error::{Error, Result};
pub use file_set::FileSet;
pub use options::{Options, ScanErrorPolicy};
pub use utils::path::{is_within, rebase};
pub use walk::{WalkStats, Walker};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::create_progress_bar;
