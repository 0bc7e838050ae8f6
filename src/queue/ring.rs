//! Fixed-capacity FIFO ring buffer.

use crate::core::{BoxedJob, PoolError, Result};

/// A fixed-capacity circular buffer of jobs.
///
/// Invariants:
/// - `0 <= len <= capacity`
/// - `insert` and `remove` each advance modulo `capacity`
/// - when `len > 0`, the slot at `remove` holds the oldest job
///
/// # Example
///
/// ```rust
/// use rust_pool_monitor::queue::JobRing;
/// use rust_pool_monitor::ClosureJob;
///
/// let mut ring = JobRing::new(2).unwrap();
/// ring.enqueue(Box::new(ClosureJob::with_name(|| {}, "first"))).unwrap();
/// ring.enqueue(Box::new(ClosureJob::with_name(|| {}, "second"))).unwrap();
///
/// // Full: the job is handed back to the caller
/// assert!(ring.enqueue(Box::new(ClosureJob::new(|| {}))).is_err());
///
/// assert_eq!(ring.dequeue().unwrap().job_type(), "first");
/// assert_eq!(ring.len(), 1);
/// ```
pub struct JobRing {
    slots: Box<[Option<BoxedJob>]>,
    insert: usize,
    remove: usize,
    len: usize,
}

impl std::fmt::Debug for JobRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRing")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("insert", &self.insert)
            .field("remove", &self.remove)
            .finish()
    }
}

impl JobRing {
    /// Allocates an empty ring with room for `capacity` jobs.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` if `capacity` is 0
    /// - `PoolError::AllocationFailure` if the slot array cannot be reserved
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PoolError::invalid_config(
                "capacity",
                "Queue capacity must be greater than 0",
            ));
        }

        let mut slots: Vec<Option<BoxedJob>> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|e| PoolError::allocation("job buffer", e.to_string()))?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            insert: 0,
            remove: 0,
            len: 0,
        })
    }

    /// Stores `job` at the insert cursor and returns the slot index used.
    ///
    /// When the ring is full the job is not stored and is handed back.
    pub fn enqueue(&mut self, job: BoxedJob) -> std::result::Result<usize, BoxedJob> {
        if self.is_full() {
            return Err(job);
        }

        let slot = self.insert;
        self.slots[slot] = Some(job);
        self.insert = (self.insert + 1) % self.capacity();
        self.len += 1;
        Ok(slot)
    }

    /// Removes and returns the oldest job, if any.
    pub fn dequeue(&mut self) -> Option<BoxedJob> {
        if self.len == 0 {
            return None;
        }

        let job = self.slots[self.remove].take();
        debug_assert!(job.is_some(), "occupied slot at remove cursor was empty");
        self.remove = (self.remove + 1) % self.capacity();
        self.len -= 1;
        job
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no job is queued.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Maximum number of jobs the ring can hold.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Removes every queued job in FIFO order without running it.
    ///
    /// Jobs not consumed from the iterator are still removed (and dropped)
    /// when the iterator is dropped.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { ring: self }
    }
}

/// Draining iterator returned by [`JobRing::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    ring: &'a mut JobRing,
}

impl Iterator for Drain<'_> {
    type Item = BoxedJob;

    fn next(&mut self) -> Option<BoxedJob> {
        self.ring.dequeue()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ring.len, Some(self.ring.len))
    }
}

impl ExactSizeIterator for Drain<'_> {}

impl Drop for Drain<'_> {
    fn drop(&mut self) {
        while self.ring.dequeue().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClosureJob;

    fn named_job(name: &str) -> BoxedJob {
        Box::new(ClosureJob::with_name(|| {}, name))
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            JobRing::new(0),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_capacity_and_empty() {
        let ring = JobRing::new(5).unwrap();
        assert_eq!(ring.capacity(), 5);
        assert_eq!(ring.len(), 0);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
    }

    #[test]
    fn test_enqueue_returns_slot_index() {
        let mut ring = JobRing::new(3).unwrap();
        assert_eq!(ring.enqueue(named_job("a")).ok(), Some(0));
        assert_eq!(ring.enqueue(named_job("b")).ok(), Some(1));
        ring.dequeue().unwrap();
        assert_eq!(ring.enqueue(named_job("c")).ok(), Some(2));
        // Wraps around to the slot freed by the first dequeue
        assert_eq!(ring.enqueue(named_job("d")).ok(), Some(0));
        assert!(ring.is_full());
    }

    #[test]
    fn test_full_hands_job_back() {
        let mut ring = JobRing::new(1).unwrap();
        ring.enqueue(named_job("kept")).unwrap();

        match ring.enqueue(named_job("rejected")) {
            Err(job) => assert_eq!(job.job_type(), "rejected"),
            Ok(_) => panic!("expected full ring to reject the job"),
        }
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_fifo_across_wraparound() {
        let mut ring = JobRing::new(3).unwrap();
        let mut seen = Vec::new();

        for round in 0..4 {
            for i in 0..3 {
                ring.enqueue(named_job(&format!("{}-{}", round, i))).unwrap();
            }
            // Partially consume so the cursors drift relative to each other
            seen.push(ring.dequeue().unwrap().job_type().to_string());
            seen.push(ring.dequeue().unwrap().job_type().to_string());
            seen.push(ring.dequeue().unwrap().job_type().to_string());
        }

        let expected: Vec<String> = (0..4)
            .flat_map(|round| (0..3).map(move |i| format!("{}-{}", round, i)))
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_dequeue_empty() {
        let mut ring = JobRing::new(2).unwrap();
        assert!(ring.dequeue().is_none());
    }

    #[test]
    fn test_drain_in_order() {
        let mut ring = JobRing::new(4).unwrap();
        ring.enqueue(named_job("x")).unwrap();
        ring.dequeue().unwrap();
        for name in ["a", "b", "c"] {
            ring.enqueue(named_job(name)).unwrap();
        }

        let drain = ring.drain();
        assert_eq!(drain.len(), 3);
        let names: Vec<String> = drain.map(|j| j.job_type().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_dropped_drain_empties_ring() {
        let mut ring = JobRing::new(4).unwrap();
        for name in ["a", "b", "c"] {
            ring.enqueue(named_job(name)).unwrap();
        }

        let mut drain = ring.drain();
        drain.next();
        drop(drain);

        assert!(ring.is_empty());
        assert_eq!(ring.enqueue(named_job("d")).ok(), Some(3));
    }

    #[test]
    fn test_drained_jobs_are_not_executed() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);
        let mut ring = JobRing::new(1).unwrap();
        ring.enqueue(Box::new(ClosureJob::new(move || {
            ran_clone.store(true, Ordering::SeqCst);
        })))
        .unwrap();

        assert_eq!(ring.drain().count(), 1);
        assert!(!ran.load(Ordering::SeqCst));
    }
}
