//! Fixed-size pool of copier workers fed through a rendezvous channel.

use crate::error::{Error, Result};
use crate::options::Options;
use crossbeam::channel::{self, Receiver, Sender};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::utils::copy_file_contents;

/// A (source, destination) pair waiting to be copied.
///
/// Immutable once created; the worker that receives it owns it for the
/// duration of the copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    src: PathBuf,
    dst: PathBuf,
}

impl CopyTask {
    /// Create a task copying `src` to `dst`
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }

    /// Source path
    #[must_use]
    pub fn src(&self) -> &Path {
        &self.src
    }

    /// Destination path
    #[must_use]
    pub fn dst(&self) -> &Path {
        &self.dst
    }
}

/// Step of a copy at which a task was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStage {
    /// Opening the source for reading
    Open,
    /// Creating the destination's parent directories
    PrepareDir,
    /// Creating (or truncating) the destination file
    Create,
    /// Streaming bytes; the destination may be left incomplete
    Write,
}

impl CopyStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open source",
            Self::PrepareDir => "create parent directory",
            Self::Create => "create destination",
            Self::Write => "write destination",
        }
    }
}

impl fmt::Display for CopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task that was abandoned.
#[derive(Debug)]
pub struct CopyFailure {
    /// Source path
    pub src: PathBuf,
    /// Destination path
    pub dst: PathBuf,
    /// Step that failed
    pub stage: CopyStage,
    /// Underlying error
    pub error: io::Error,
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: failed to {}: {}",
            self.src.display(),
            self.dst.display(),
            self.stage,
            self.error
        )
    }
}

/// Outcome of a pool run.
///
/// Returned by [`RunningPool::wait`]. A run always drains its whole queue,
/// so a report with failures is still a finished run.
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Number of files fully copied
    pub files_copied: u64,
    /// Total bytes of the fully copied files
    pub bytes_copied: u64,
    /// Abandoned tasks, sorted by source path
    pub failures: Vec<CopyFailure>,
    /// Time from `start` to the end of `wait`
    pub duration: Duration,
}

impl CopyReport {
    /// Number of tasks the pool handled
    #[must_use]
    pub fn total(&self) -> usize {
        self.files_copied as usize + self.failures.len()
    }

    /// Whether every task was copied
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a report with failures into [`Error::PartialCopy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartialCopy`] if any task failed.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::PartialCopy {
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }

    fn absorb(&mut self, tally: WorkerTally) {
        self.files_copied += tally.files_copied;
        self.bytes_copied += tally.bytes_copied;
        self.failures.extend(tally.failures);
    }
}

/// What one worker did before the queue closed.
#[derive(Debug, Default)]
struct WorkerTally {
    files_copied: u64,
    bytes_copied: u64,
    failures: Vec<CopyFailure>,
}

#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    finished: AtomicU64,
}

/// A copier pool that has not been started yet.
///
/// # Example
///
/// ```no_run
/// use bro_engine::CopierPool;
///
/// let pool = CopierPool::new(16).start()?;
/// pool.copy("project/a.txt", "stage/a.txt")?;
/// pool.copy("project/src/b.rs", "stage/src/b.rs")?;
/// let report = pool.wait()?;
/// println!("copied {} files", report.files_copied);
/// # Ok::<(), bro_engine::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CopierPool {
    options: Options,
}

impl CopierPool {
    /// Create a pool of `workers` copier threads
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self::with_options(&Options::default().with_parallel(workers))
    }

    /// Create a pool sized by `options.parallel`
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        Self {
            options: options.clone(),
        }
    }

    /// Number of workers `start` will launch
    #[must_use]
    pub fn workers(&self) -> usize {
        self.options.bound()
    }

    /// Launch the workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a worker thread cannot be spawned. Workers
    /// spawned before the failure are shut down first.
    pub fn start(self) -> Result<RunningPool> {
        let workers = self.workers();
        // Zero capacity: `copy` returns only once a worker has taken the task
        let (sender, receiver) = channel::bounded::<CopyTask>(0);
        let counters = Arc::new(PoolCounters::default());
        let options = Arc::new(self.options);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let tasks = receiver.clone();
            let counters = Arc::clone(&counters);
            let options = Arc::clone(&options);

            let spawned = thread::Builder::new()
                .name(format!("bro-copy-{worker_id}"))
                .spawn(move || run_worker(&tasks, &counters, &options));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    drop(sender);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(e.into());
                }
            }
        }

        tracing::debug!(workers, "copier pool started");

        Ok(RunningPool {
            sender,
            workers: handles,
            counters,
            started: Instant::now(),
        })
    }
}

/// A started copier pool accepting tasks.
///
/// [`copy`](Self::copy) takes `&self`, so several producer threads may feed
/// the same pool. [`wait`](Self::wait) consumes the pool; a drained pool
/// cannot be restarted. Dropping a running pool without waiting closes the
/// queue and detaches the workers, which still finish what they accepted.
#[derive(Debug)]
pub struct RunningPool {
    sender: Sender<CopyTask>,
    workers: Vec<JoinHandle<WorkerTally>>,
    counters: Arc<PoolCounters>,
    started: Instant,
}

impl RunningPool {
    /// Hand a copy task to the next free worker.
    ///
    /// Blocks until a worker accepts the task. Failures of the copy itself
    /// are not reported here; they show up in the [`CopyReport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolClosed`] if no worker is left to accept it.
    pub fn copy(&self, src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Result<()> {
        self.submit(CopyTask::new(src, dst))
    }

    /// Hand an existing task to the next free worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolClosed`] if no worker is left to accept it.
    pub fn submit(&self, task: CopyTask) -> Result<()> {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        if self.sender.send(task).is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::PoolClosed);
        }
        Ok(())
    }

    /// `(finished, submitted)` task counts so far
    #[must_use]
    pub fn progress(&self) -> (u64, u64) {
        (
            self.counters.finished.load(Ordering::Relaxed),
            self.counters.submitted.load(Ordering::Relaxed),
        )
    }

    /// Close the queue and block until every worker has drained it and exited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] if a worker thread panicked. All
    /// workers are joined before returning either way.
    pub fn wait(self) -> Result<CopyReport> {
        let Self {
            sender,
            workers,
            counters: _,
            started,
        } = self;
        drop(sender);

        let mut report = CopyReport::default();
        let mut panicked = None;
        for (worker, handle) in workers.into_iter().enumerate() {
            match handle.join() {
                Ok(tally) => report.absorb(tally),
                Err(_) => {
                    panicked.get_or_insert(worker);
                }
            }
        }
        report.duration = started.elapsed();
        report.failures.sort_by(|a, b| a.src.cmp(&b.src));

        if let Some(worker) = panicked {
            return Err(Error::WorkerPanicked { worker });
        }

        tracing::debug!(
            copied = report.files_copied,
            failed = report.failures.len(),
            bytes = report.bytes_copied,
            elapsed = ?report.duration,
            "copier pool drained"
        );

        Ok(report)
    }
}

fn run_worker(
    tasks: &Receiver<CopyTask>,
    counters: &PoolCounters,
    options: &Options,
) -> WorkerTally {
    let mut tally = WorkerTally::default();

    // recv fails only once the queue is closed and empty
    while let Ok(task) = tasks.recv() {
        match copy_one(&task) {
            Ok(bytes) => {
                tally.files_copied += 1;
                tally.bytes_copied += bytes;
                tracing::trace!(
                    src = %task.src.display(),
                    dst = %task.dst.display(),
                    bytes,
                    "copied"
                );
            }
            Err((stage, error)) => {
                let failure = CopyFailure {
                    src: task.src,
                    dst: task.dst,
                    stage,
                    error,
                };
                options.warn(&format!("Failed to copy {failure}"));
                tally.failures.push(failure);
            }
        }
        counters.finished.fetch_add(1, Ordering::Relaxed);
    }

    tally
}

/// Copy one file. Both handles are closed when they go out of scope,
/// whether or not the copy succeeded.
fn copy_one(task: &CopyTask) -> std::result::Result<u64, (CopyStage, io::Error)> {
    let src = File::open(&task.src).map_err(|e| (CopyStage::Open, e))?;

    if let Some(parent) = task.dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| (CopyStage::PrepareDir, e))?;
    }

    let dst = File::create(&task.dst).map_err(|e| (CopyStage::Create, e))?;
    copy_file_contents(&src, &dst).map_err(|e| (CopyStage::Write, e))
}
