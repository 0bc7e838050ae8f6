//! # Rust Pool Monitor
//!
//! A fixed-capacity worker pool built as a monitor: one lock and one
//! "job available" condition guard a bounded FIFO job queue that a set of
//! persistent worker threads consume.
//!
//! ## Features
//!
//! - **Bounded Queue**: Fixed-capacity circular buffer; submissions fail fast with
//!   [`PoolError::QueueFull`] instead of blocking
//! - **Strict FIFO**: Jobs are dequeued in exactly the order they were submitted
//! - **Cooperative Cancellation**: Workers are only cancelled while idle; a dequeued
//!   job always runs to completion
//! - **Re-initialization**: `init` / `shutdown` can be cycled on the same handle
//! - **Panic Isolation**: A panicking job is logged and counted, the worker survives
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_pool_monitor::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::new();
//! pool.init(4, 100)?;
//!
//! for i in 0..10 {
//!     pool.execute(move || println!("Job {} executing", i))?;
//! }
//!
//! // Cancels idle workers, waits for running jobs, discards the rest
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Handling a Full Queue
//!
//! ```rust
//! use rust_pool_monitor::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::new();
//! pool.init(1, 1)?;
//!
//! for x in 0..5u32 {
//!     match pool.execute_with_arg(|x: u32| { let _ = x.pow(2); }, x) {
//!         Ok(()) => {}
//!         Err(e) if e.is_retryable() => println!("dropping {}: {}", x, e),
//!         Err(e) => return Err(e),
//!     }
//! }
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Jobs
//!
//! ```rust
//! use rust_pool_monitor::prelude::*;
//!
//! struct PrimeCheck {
//!     n: u64,
//! }
//!
//! impl Job for PrimeCheck {
//!     fn execute(&mut self) {
//!         let prime = self.n > 1 && (2..self.n).take_while(|d| d * d <= self.n).all(|d| self.n % d != 0);
//!         println!("{} prime: {}", self.n, prime);
//!     }
//!
//!     fn job_type(&self) -> &str {
//!         "PrimeCheck"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let pool = ThreadPool::new();
//! # pool.init(2, 8)?;
//! pool.submit(PrimeCheck { n: 97 })?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod tracing;

pub use crate::core::{
    ArgJob, BoxedJob, CancellationReason, CancellationToken, ClosureJob, Job, PoolError, Result,
};
pub use crate::pool::{PoolState, PoolStats, ThreadPool, ThreadPoolConfig, WorkerState, WorkerStats};
