//! Thread pool controller

use crate::core::{ArgJob, BoxedJob, CancellationReason, ClosureJob, Job, PoolError, Result};
use crate::pool::config::ThreadPoolConfig;
use crate::pool::stats::{PoolCounters, PoolStats};
use crate::pool::worker::{Worker, WorkerStats};
use crate::pool::PoolState;
use crate::queue::JobRing;
use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Everything guarded by the pool lock
#[derive(Debug, Default)]
pub(crate) struct PoolInner {
    pub(crate) state: PoolState,
    pub(crate) queue: Option<JobRing>,
    pub(crate) workers: Vec<Worker>,
    pub(crate) initialized_at: Option<DateTime<Utc>>,
}

/// The monitor shared by the controller and its workers: one lock plus the
/// "job available" condition.
#[derive(Debug, Default)]
pub(crate) struct PoolShared {
    pub(crate) inner: Mutex<PoolInner>,
    pub(crate) job_available: Condvar,
}

impl PoolShared {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// A fixed-size pool of worker threads serving a bounded FIFO job queue
///
/// The handle starts [`Uninitialized`](PoolState::Uninitialized). [`init`]
/// allocates the queue and spawns the workers, [`shutdown`] cancels and joins
/// them and discards whatever is still queued, after which [`init`] may be
/// called again.
///
/// # Cancellation
///
/// Workers are only interruptible while idle. A job that has been dequeued
/// always runs to completion, so [`shutdown`] blocks until in-flight jobs are
/// done. Jobs still queued at that point are dropped without running and
/// without notifying their submitters.
///
/// # Example
///
/// ```rust
/// use rust_pool_monitor::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pool = ThreadPool::with_name("primes");
/// pool.init(4, 16)?;
///
/// pool.execute_with_arg(|x: u64| println!("{} squared is {}", x, x * x), 12)?;
///
/// pool.shutdown()?;
/// assert_eq!(pool.queue_size(), 0);
///
/// // The same handle can be brought back up
/// pool.init(2, 8)?;
/// # pool.shutdown()?;
/// # Ok(())
/// # }
/// ```
///
/// [`init`]: ThreadPool::init
/// [`shutdown`]: ThreadPool::shutdown
pub struct ThreadPool {
    name: String,
    thread_name_prefix: String,
    shared: Arc<PoolShared>,
    counters: PoolCounters,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("queue_size", &self.queue_size())
            .finish()
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadPool {
    /// Create an uninitialized pool named "pool" whose workers are named
    /// `worker-{id}`
    pub fn new() -> Self {
        let mut pool = Self::with_name("pool");
        pool.thread_name_prefix = ThreadPoolConfig::DEFAULT_THREAD_NAME_PREFIX.to_string();
        pool
    }

    /// Create an uninitialized pool with a name used in logs and errors
    ///
    /// The name is also the thread name prefix [`init`](ThreadPool::init)
    /// gives its workers: `{name}-{id}`.
    pub fn with_name<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            thread_name_prefix: name.clone(),
            name,
            shared: Arc::new(PoolShared::new()),
            counters: PoolCounters::default(),
        }
    }

    /// Get the pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start `pool_size` workers serving a queue of `capacity` slots
    ///
    /// Workers take the thread name prefix chosen at construction.
    ///
    /// # Errors
    ///
    /// - `PoolError::AlreadyInitialized` - Pool is running or shutting down
    /// - `PoolError::InvalidConfig` - `pool_size` or `capacity` is 0
    /// - `PoolError::AllocationFailure` - Queue or worker thread allocation failed
    pub fn init(&self, pool_size: usize, capacity: usize) -> Result<()> {
        self.init_with_config(
            ThreadPoolConfig::new(pool_size, capacity)
                .with_thread_name_prefix(self.thread_name_prefix.as_str()),
        )
    }

    /// Start the pool from a full configuration
    ///
    /// On failure every partially created resource is released and the pool
    /// stays [`Uninitialized`](PoolState::Uninitialized).
    pub fn init_with_config(&self, config: ThreadPoolConfig) -> Result<()> {
        config.validate()?;

        let mut inner = self.shared.inner.lock();
        if inner.state != PoolState::Uninitialized {
            return Err(PoolError::already_initialized(&self.name, inner.state));
        }

        log::info!(
            "{}: initializing with pool_size={}, capacity={}",
            self.name,
            config.pool_size,
            config.capacity
        );

        let queue = JobRing::new(config.capacity)?;
        let mut workers = Vec::new();
        workers
            .try_reserve_exact(config.pool_size)
            .map_err(|e| PoolError::allocation("worker set", e.to_string()))?;
        inner.queue = Some(queue);

        // Workers block on the lock held here until init returns
        for id in 0..config.pool_size {
            match Worker::spawn(id, &config.thread_name_prefix, Arc::clone(&self.shared)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    log::error!("{}: init failed at worker-{}: {}", self.name, id, e);
                    for worker in &workers {
                        worker.cancel(CancellationReason::InitRollback);
                    }
                    // Keeps init/shutdown exclusive while the rollback joins
                    inner.state = PoolState::ShuttingDown;
                    self.shared.job_available.notify_all();
                    drop(inner);

                    for worker in workers {
                        let worker_id = worker.id();
                        if let Err(join_err) = worker.join() {
                            log::error!(
                                "{}: rollback could not join worker-{}: {}",
                                self.name,
                                worker_id,
                                join_err
                            );
                        }
                    }

                    let mut inner = self.shared.inner.lock();
                    inner.queue = None;
                    inner.state = PoolState::Uninitialized;
                    return Err(e);
                }
            }
        }

        inner.workers = workers;
        inner.initialized_at = Some(Utc::now());
        inner.state = PoolState::Running;
        Ok(())
    }

    /// Submit a job to the queue
    ///
    /// The job is allocated before the lock is taken. If it is rejected it
    /// is dropped without running.
    ///
    /// # Errors
    ///
    /// - `PoolError::NotInitialized` - Pool is not initialized
    /// - `PoolError::ShuttingDown` - Pool is shutting down
    /// - `PoolError::QueueFull` - Every slot is occupied
    pub fn submit<J: Job + 'static>(&self, job: J) -> Result<()> {
        self.submit_boxed(Box::new(job))
    }

    /// Submit an already boxed job
    pub fn submit_boxed(&self, job: BoxedJob) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            PoolState::Running => {}
            PoolState::Uninitialized => return Err(PoolError::not_initialized(&self.name)),
            PoolState::ShuttingDown => return Err(PoolError::shutting_down(&self.name)),
        }
        let queue = inner
            .queue
            .as_mut()
            .ok_or_else(|| PoolError::not_initialized(&self.name))?;

        match queue.enqueue(job) {
            Ok(slot) => {
                self.shared.job_available.notify_one();
                drop(inner);
                PoolCounters::add(&self.counters.submitted, 1);
                log::debug!("{}: received job {}", self.name, slot);
                Ok(())
            }
            Err(rejected) => {
                let (current, max) = (queue.len(), queue.capacity());
                drop(inner);
                drop(rejected);
                PoolCounters::add(&self.counters.rejected, 1);
                log::warn!("{}: queue full ({}/{}), job rejected", self.name, current, max);
                Err(PoolError::queue_full(current, max))
            }
        }
    }

    /// Submit a closure
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(ClosureJob::new(f))
    }

    /// Submit `func` to be called with `arg`
    pub fn execute_with_arg<F, A>(&self, func: F, arg: A) -> Result<()>
    where
        F: FnOnce(A) + Send + 'static,
        A: Send + 'static,
    {
        self.submit(ArgJob::new(func, arg))
    }

    /// Number of jobs currently queued, in any state
    pub fn queue_size(&self) -> usize {
        self.shared
            .inner
            .lock()
            .queue
            .as_ref()
            .map_or(0, JobRing::len)
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        self.shared.inner.lock().state
    }

    /// Check if the pool is running
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Number of workers in the current Worker Set
    pub fn num_threads(&self) -> usize {
        self.shared.inner.lock().workers.len()
    }

    /// Get statistics for the current workers, indexed by worker id
    pub fn get_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.shared
            .inner
            .lock()
            .workers
            .iter()
            .map(Worker::stats)
            .collect()
    }

    /// Snapshot of the pool's state and cumulative counters
    pub fn stats(&self) -> PoolStats {
        let inner = self.shared.inner.lock();
        let (live_executed, live_panicked) = inner.workers.iter().fold((0, 0), |acc, w| {
            let stats = w.stats();
            (
                acc.0 + stats.get_jobs_executed(),
                acc.1 + stats.get_jobs_panicked(),
            )
        });

        PoolStats {
            name: self.name.clone(),
            state: inner.state,
            pool_size: inner.workers.len(),
            capacity: inner.queue.as_ref().map_or(0, JobRing::capacity),
            queue_size: inner.queue.as_ref().map_or(0, JobRing::len),
            jobs_submitted: PoolCounters::get(&self.counters.submitted),
            jobs_rejected: PoolCounters::get(&self.counters.rejected),
            jobs_discarded: PoolCounters::get(&self.counters.discarded),
            jobs_executed: PoolCounters::get(&self.counters.retired_executed) + live_executed,
            jobs_panicked: PoolCounters::get(&self.counters.retired_panicked) + live_panicked,
            initialized_at: inner.initialized_at,
        }
    }

    /// Shutdown the pool
    ///
    /// 1. Moves to `ShuttingDown` and cancels every worker under the lock
    /// 2. Wakes all parked workers and releases the lock
    /// 3. Joins every worker, waiting without timeout for in-flight jobs
    /// 4. Drops every job still queued without running it
    /// 5. Releases the queue and Worker Set and returns to `Uninitialized`
    ///
    /// # Errors
    ///
    /// - `PoolError::NotInitialized` - Pool is not initialized
    /// - `PoolError::ShuttingDown` - Another shutdown is in progress
    /// - `PoolError::WorkerPanic` - A worker thread died abnormally; the pool
    ///   is still fully reset
    pub fn shutdown(&self) -> Result<()> {
        let workers = {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                PoolState::Running => {}
                PoolState::Uninitialized => return Err(PoolError::not_initialized(&self.name)),
                PoolState::ShuttingDown => return Err(PoolError::shutting_down(&self.name)),
            }

            inner.state = PoolState::ShuttingDown;
            log::info!("{}: shutdown started", self.name);

            for worker in &inner.workers {
                log::debug!("{}: cancelling worker-{}", self.name, worker.id());
                worker.cancel(CancellationReason::Shutdown);
            }
            self.shared.job_available.notify_all();
            std::mem::take(&mut inner.workers)
        };

        let mut first_error = None;
        for worker in workers {
            let worker_id = worker.id();
            let stats = worker.stats();
            log::debug!("{}: joining worker-{}", self.name, worker_id);
            if let Err(e) = worker.join() {
                log::error!("{}: {}", self.name, e);
                first_error.get_or_insert(e);
            }
            PoolCounters::add(&self.counters.retired_executed, stats.get_jobs_executed());
            PoolCounters::add(&self.counters.retired_panicked, stats.get_jobs_panicked());
        }

        // Drained jobs are dropped outside the lock
        let queue = self.shared.inner.lock().queue.take();
        let discarded = match queue {
            Some(mut queue) => queue.drain().count(),
            None => 0,
        };
        PoolCounters::add(&self.counters.discarded, discarded as u64);

        {
            let mut inner = self.shared.inner.lock();
            inner.initialized_at = None;
            inner.state = PoolState::Uninitialized;
        }
        log::info!(
            "{}: shutdown finished, {} queued job(s) discarded",
            self.name,
            discarded
        );

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if self.state() == PoolState::Running {
            if let Err(e) = self.shutdown() {
                log::error!(
                    "{}: failed to shutdown thread pool during drop: {}",
                    self.name,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_thread_pool_creation() {
        let pool = ThreadPool::new();
        assert_eq!(pool.state(), PoolState::Uninitialized);
        assert_eq!(pool.num_threads(), 0);

        pool.init(4, 10).expect("Failed to init pool");
        assert!(pool.is_running());
        assert_eq!(pool.num_threads(), 4);

        pool.shutdown().expect("Failed to shutdown pool");
        assert_eq!(pool.state(), PoolState::Uninitialized);
        assert_eq!(pool.num_threads(), 0);
    }

    #[test]
    fn test_job_execution() {
        let pool = ThreadPool::new();
        pool.init(2, 16).expect("Failed to init pool");

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::Relaxed);
            })
            .expect("Failed to submit job");
        }

        let start = std::time::Instant::now();
        while pool.stats().jobs_executed < 10 && start.elapsed() < Duration::from_secs(2) {
            thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(counter.load(Ordering::Relaxed), 10);
        assert_eq!(pool.stats().jobs_submitted, 10);
        assert_eq!(pool.stats().jobs_executed, 10);

        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_init_twice_fails() {
        let pool = ThreadPool::with_name("twice");
        pool.init(1, 1).expect("Failed to init pool");

        let err = pool.init(1, 1).unwrap_err();
        assert!(matches!(
            err,
            PoolError::AlreadyInitialized {
                state: PoolState::Running,
                ..
            }
        ));

        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_submit_when_not_initialized() {
        let pool = ThreadPool::new();
        let result = pool.execute(|| {});
        assert!(matches!(result, Err(PoolError::NotInitialized { .. })));
        assert_eq!(pool.stats().jobs_submitted, 0);
    }

    #[test]
    fn test_shutdown_when_not_initialized() {
        let pool = ThreadPool::new();
        assert!(matches!(
            pool.shutdown(),
            Err(PoolError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_invalid_init_leaves_pool_uninitialized() {
        let pool = ThreadPool::new();
        assert!(matches!(
            pool.init(0, 10),
            Err(PoolError::InvalidConfig { .. })
        ));
        assert!(matches!(
            pool.init(2, 0),
            Err(PoolError::InvalidConfig { .. })
        ));
        assert_eq!(pool.state(), PoolState::Uninitialized);

        pool.init(2, 2).expect("valid init after invalid ones");
        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_thread_names_use_prefix() {
        let pool = ThreadPool::new();
        pool.init_with_config(ThreadPoolConfig::new(1, 2).with_thread_name_prefix("prime"))
            .expect("Failed to init pool");

        let (tx, rx) = std::sync::mpsc::channel();
        pool.execute(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).expect("receiver alive");
        })
        .expect("Failed to submit job");

        let name = rx
            .recv_timeout(Duration::from_secs(1))
            .expect("job did not run");
        assert_eq!(name.as_deref(), Some("prime-0"));

        pool.shutdown().expect("Failed to shutdown pool");
    }

    #[test]
    fn test_shutdown_discards_queued_jobs() {
        let pool = ThreadPool::new();
        pool.init(1, 8).expect("Failed to init pool");

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        pool.execute(move || {
            started_tx.send(()).expect("receiver alive");
            thread::sleep(Duration::from_millis(100));
        })
        .expect("Failed to submit blocking job");
        started_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("blocking job did not start");

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let ran_clone = Arc::clone(&ran);
            pool.execute(move || {
                ran_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("Failed to submit job");
        }
        assert_eq!(pool.queue_size(), 5);

        pool.shutdown().expect("Failed to shutdown pool");

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(pool.queue_size(), 0);
        let stats = pool.stats();
        assert_eq!(stats.jobs_discarded, 5);
        assert_eq!(stats.jobs_executed, 1);
        assert_eq!(stats.jobs_in_flight(), 0);
    }

    #[test]
    fn test_drop_shuts_down_running_pool() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPool::new();
            pool.init(2, 4).expect("Failed to init pool");
            let counter_clone = Arc::clone(&counter);
            let (started_tx, started_rx) = std::sync::mpsc::channel();
            pool.execute(move || {
                started_tx.send(()).expect("receiver alive");
                thread::sleep(Duration::from_millis(20));
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("Failed to submit job");
            started_rx
                .recv_timeout(Duration::from_secs(1))
                .expect("job did not start");
        }
        // Drop joined the workers, so the in-flight job has finished
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_output() {
        let pool = ThreadPool::with_name("dbg");
        let rendered = format!("{:?}", pool);
        assert!(rendered.contains("dbg"));
        assert!(rendered.contains("Uninitialized"));
    }
}
