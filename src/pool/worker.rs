//! Worker thread implementation

use crate::core::{BoxedJob, CancellationReason, CancellationToken, PoolError, Result};
use crate::pool::thread_pool::PoolShared;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

#[cfg(feature = "tracing")]
use tracing::{span, Level};

/// Where a worker is in its loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Parked (or about to park) on the job-available condition
    Waiting,
    /// Running a job; cancellation is not observed until it finishes
    Executing,
    /// Observed its cancellation flag and left the loop
    Cancelled,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::Executing,
            2 => WorkerState::Cancelled,
            _ => WorkerState::Waiting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Waiting => 0,
            WorkerState::Executing => 1,
            WorkerState::Cancelled => 2,
        }
    }
}

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of jobs that ran to completion
    pub jobs_executed: AtomicU64,
    /// Total number of jobs that panicked
    pub jobs_panicked: AtomicU64,
    /// Total time spent processing jobs (microseconds)
    pub total_processing_time_us: AtomicU64,
    state: AtomicU8,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment jobs executed counter
    pub fn increment_executed(&self) {
        self.jobs_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs panicked counter
    pub fn increment_panicked(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Add processing time
    pub fn add_processing_time(&self, microseconds: u64) {
        self.total_processing_time_us
            .fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Get total jobs executed
    pub fn get_jobs_executed(&self) -> u64 {
        self.jobs_executed.load(Ordering::Relaxed)
    }

    /// Get total jobs panicked
    pub fn get_jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }

    /// Get average processing time per job in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.get_jobs_executed() + self.get_jobs_panicked();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Current position of the worker in its loop
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// A worker thread that consumes jobs from its pool's queue
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    token: CancellationToken,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a worker named `{name_prefix}-{id}` that serves `shared`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::AllocationFailure` if the OS refuses the thread.
    pub(crate) fn spawn(id: usize, name_prefix: &str, shared: Arc<PoolShared>) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(move || {
                Self::run(id, shared, token_clone, stats_clone);
            })
            .map_err(|e| {
                PoolError::allocation_with_source(
                    format!("worker thread #{}", id),
                    "thread spawn failed",
                    e,
                )
            })?;

        Ok(Self {
            id,
            thread: Some(thread),
            token,
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Request cancellation.
    ///
    /// Must be called with the pool lock held, followed by a broadcast on the
    /// job-available condition, so a parked worker cannot miss it.
    pub(crate) fn cancel(&self, reason: CancellationReason) {
        self.token.cancel_with_reason(reason);
    }

    /// Join the worker thread, blocking until it has terminated
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|panic_info| PoolError::worker_panic(self.id, panic_message(&*panic_info)))?;
        }
        Ok(())
    }

    /// Main worker loop
    ///
    /// The wait on the job-available condition is the only place the
    /// cancellation flag is read. The lock guard is scoped to the wait and
    /// dequeue, so every exit from it (job taken or cancelled) releases the
    /// lock, and no job ever runs with the lock held.
    fn run(id: usize, shared: Arc<PoolShared>, token: CancellationToken, stats: Arc<WorkerStats>) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        log::debug!("worker-{}: initializing", id);

        loop {
            let job = {
                let mut inner = shared.inner.lock();
                loop {
                    if token.is_cancelled() {
                        stats.set_state(WorkerState::Cancelled);
                        log::debug!(
                            "worker-{}: exiting ({}), jobs executed: {}, panicked: {}",
                            id,
                            token
                                .reason()
                                .unwrap_or(CancellationReason::Manual),
                            stats.get_jobs_executed(),
                            stats.get_jobs_panicked()
                        );
                        return;
                    }
                    if let Some(job) = inner.queue.as_mut().and_then(|queue| queue.dequeue()) {
                        break job;
                    }
                    log::trace!("worker-{}: no job available, waiting", id);
                    shared.job_available.wait(&mut inner);
                }
            };

            stats.set_state(WorkerState::Executing);
            Self::execute_job(id, job, &stats);
            stats.set_state(WorkerState::Waiting);
        }
    }

    /// Execute and drop a single job with panic protection
    ///
    /// The job is dropped inside the guarded call, so a panicking `Drop` of
    /// captured state is counted like a panicking job.
    fn execute_job(id: usize, mut job: BoxedJob, stats: &WorkerStats) {
        let job_type = job.job_type().to_string();

        #[cfg(feature = "tracing")]
        let job_span = span!(Level::DEBUG, "job_execution", job_type = job_type.as_str());
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        let start = std::time::Instant::now();

        let panic_result = catch_unwind(AssertUnwindSafe(move || {
            job.execute();
            drop(job);
        }));

        let elapsed = start.elapsed();

        match panic_result {
            Ok(()) => {
                stats.increment_executed();
                log::trace!(
                    "worker-{}: {} finished in {}us",
                    id,
                    job_type,
                    elapsed.as_micros()
                );
            }
            Err(panic_info) => {
                log::warn!(
                    "worker-{}: {} panicked: {}",
                    id,
                    job_type,
                    panic_message(&*panic_info)
                );
                stats.increment_panicked();
            }
        }

        stats.add_processing_time(elapsed.as_micros() as u64);
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
