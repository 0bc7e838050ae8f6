//! Pool lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a [`ThreadPool`](crate::pool::ThreadPool).
///
/// ```text
/// Uninitialized --init--> Running --shutdown--> ShuttingDown --(joined, drained)--> Uninitialized
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// No queue and no workers; `init` is legal
    #[default]
    Uninitialized,
    /// Workers are consuming jobs; `submit` and `shutdown` are legal
    Running,
    /// Workers are being cancelled and joined; only `queue_size` is useful
    ShuttingDown,
}

impl PoolState {
    /// Returns `true` for [`PoolState::Running`]
    pub fn is_running(self) -> bool {
        self == PoolState::Running
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolState::Uninitialized => "uninitialized",
            PoolState::Running => "running",
            PoolState::ShuttingDown => "shutting down",
        };
        f.write_str(s)
    }
}
