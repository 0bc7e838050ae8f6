//! Core types and traits for the pool monitor

pub mod cancellation;
pub mod error;
pub mod job;

pub use cancellation::{CancellationReason, CancellationToken};
pub use error::{PoolError, Result};
pub use job::{ArgJob, BoxedJob, ClosureJob, Job};
