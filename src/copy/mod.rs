//! Bounded copier pool.
//!
//! This module provides a fixed set of worker threads that copy whole files
//! from (source, destination) pairs handed to them one at a time.

mod pool;
mod utils;

// Re-export public API
pub use pool::{CopierPool, CopyFailure, CopyReport, CopyStage, CopyTask, RunningPool};
