//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, every worker runs inside a
//! `worker{id}` span and every job inside a `job_execution{job_type}` span.
//! [`TracedJob`] additionally carries the submitter's span across the queue.
//!
//! # Example
//!
//! ```rust,ignore
//! use rust_pool_monitor::prelude::*;
//! use rust_pool_monitor::tracing::TracedJob;
//!
//! let pool = ThreadPool::new();
//! pool.init(4, 64)?;
//!
//! let span = tracing::info_span!("request", id = 7);
//! let _entered = span.enter();
//! pool.submit(TracedJob::new(ClosureJob::new(|| tracing::info!("inside request span"))))?;
//! ```

use crate::core::Job;

/// A job wrapper that propagates tracing context across thread boundaries.
///
/// The current span is captured at construction and entered while the
/// inner job executes on the worker thread. Without the `tracing` feature
/// it is a transparent wrapper.
pub struct TracedJob<J: Job> {
    inner: J,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<J: Job> TracedJob<J> {
    /// Wraps `job`, capturing the current span.
    pub fn new(job: J) -> Self {
        Self {
            inner: job,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Wraps `job` with an explicit span.
    #[cfg(feature = "tracing")]
    pub fn with_span(job: J, span: tracing::Span) -> Self {
        Self { inner: job, span }
    }
}

impl<J: Job> Job for TracedJob<J> {
    fn execute(&mut self) {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.execute()
    }

    fn job_type(&self) -> &str {
        self.inner.job_type()
    }
}
