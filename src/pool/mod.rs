//! Thread pool and worker implementations

pub mod config;
mod state;
pub mod stats;
pub mod thread_pool;
pub mod worker;

pub use config::ThreadPoolConfig;
pub use state::PoolState;
pub use stats::PoolStats;
pub use thread_pool::ThreadPool;
pub use worker::{Worker, WorkerState, WorkerStats};
