//! Pool-level counters and snapshots

use crate::pool::PoolState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters kept for the lifetime of a pool handle.
///
/// They survive shutdown/re-init cycles. Work done by retired workers is
/// folded in when they are joined.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub(crate) submitted: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) discarded: AtomicU64,
    pub(crate) retired_executed: AtomicU64,
    pub(crate) retired_panicked: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a pool
#[derive(Clone, Debug, Serialize)]
pub struct PoolStats {
    /// Pool name
    pub name: String,
    /// Lifecycle state
    pub state: PoolState,
    /// Worker count of the current Worker Set (0 when uninitialized)
    pub pool_size: usize,
    /// Queue capacity (0 when uninitialized)
    pub capacity: usize,
    /// Jobs currently queued
    pub queue_size: usize,
    /// Jobs accepted by `submit`
    pub jobs_submitted: u64,
    /// Jobs rejected because the queue was full
    pub jobs_rejected: u64,
    /// Jobs dropped unexecuted by shutdown drains
    pub jobs_discarded: u64,
    /// Jobs that ran to completion
    pub jobs_executed: u64,
    /// Jobs that panicked
    pub jobs_panicked: u64,
    /// When the current Worker Set was started
    pub initialized_at: Option<DateTime<Utc>>,
}

impl PoolStats {
    /// Jobs accepted but neither finished nor discarded yet (queued or running)
    pub fn jobs_in_flight(&self) -> u64 {
        self.jobs_submitted
            .saturating_sub(self.jobs_executed + self.jobs_panicked + self.jobs_discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_in_flight() {
        let stats = PoolStats {
            name: "p".to_string(),
            state: PoolState::Running,
            pool_size: 2,
            capacity: 10,
            queue_size: 3,
            jobs_submitted: 10,
            jobs_rejected: 4,
            jobs_discarded: 1,
            jobs_executed: 5,
            jobs_panicked: 1,
            initialized_at: Some(Utc::now()),
        };
        assert_eq!(stats.jobs_in_flight(), 3);
    }

    #[test]
    fn test_counters_accumulate() {
        let counters = PoolCounters::default();
        PoolCounters::add(&counters.submitted, 3);
        PoolCounters::add(&counters.submitted, 2);
        assert_eq!(PoolCounters::get(&counters.submitted), 5);
        assert_eq!(PoolCounters::get(&counters.rejected), 0);
    }
}
