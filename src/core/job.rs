//! Job trait and related types

use std::fmt;

/// A unit of work executed by exactly one worker, exactly once
///
/// A job is owned by its queue slot until a worker dequeues it. The worker
/// then owns it for the duration of [`execute`](Job::execute) and drops it
/// afterwards.
pub trait Job: Send {
    /// Execute the job to completion
    fn execute(&mut self);

    /// Get the job's type name for debugging and logging
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.job_type())
    }
}

/// A boxed job that can be sent across threads
pub type BoxedJob = Box<dyn Job>;

/// Helper to create a job from a closure
pub struct ClosureJob<F>
where
    F: FnOnce() + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureJob<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure job
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureJob".to_string(),
        }
    }

    /// Create a new closure job with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnOnce() + Send,
{
    fn execute(&mut self) {
        // A second call is a no-op: the closure was consumed by the first.
        if let Some(closure) = self.closure.take() {
            closure();
        }
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}

/// A callable paired with the single argument it will be invoked with
///
/// ```rust
/// use rust_pool_monitor::{ArgJob, Job};
///
/// fn is_even(x: i32) {
///     assert_eq!(x % 2, 0);
/// }
///
/// let mut job = ArgJob::new(is_even, 42);
/// assert_eq!(job.arg(), Some(&42));
/// job.execute();
/// assert_eq!(job.arg(), None);
/// ```
pub struct ArgJob<F, A>
where
    F: FnOnce(A) + Send,
    A: Send,
{
    call: Option<(F, A)>,
}

impl<F, A> ArgJob<F, A>
where
    F: FnOnce(A) + Send,
    A: Send,
{
    /// Pair `func` with `arg`
    pub fn new(func: F, arg: A) -> Self {
        Self {
            call: Some((func, arg)),
        }
    }

    /// The argument, until the job has run
    pub fn arg(&self) -> Option<&A> {
        self.call.as_ref().map(|(_, arg)| arg)
    }
}

impl<F, A> Job for ArgJob<F, A>
where
    F: FnOnce(A) + Send,
    A: Send,
{
    fn execute(&mut self) {
        if let Some((func, arg)) = self.call.take() {
            func(arg);
        }
    }

    fn job_type(&self) -> &str {
        "ArgJob"
    }
}
