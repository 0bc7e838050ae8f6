//! Convenient re-exports for common types and traits

pub use crate::core::{ArgJob, BoxedJob, ClosureJob, Job, PoolError, Result};
pub use crate::pool::{PoolState, PoolStats, ThreadPool, ThreadPoolConfig, WorkerStats};
