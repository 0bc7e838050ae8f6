//! Cooperative worker cancellation
//!
//! A [`CancellationToken`] is a shared flag. The pool sets it while holding
//! the pool lock and then wakes every waiting worker; a worker only looks at
//! its token at its wait point, never while a job is running.
//!
//! # Example
//!
//! ```rust
//! use rust_pool_monitor::{CancellationReason, CancellationToken};
//!
//! let token = CancellationToken::new();
//! let observer = token.clone();
//!
//! assert!(!observer.is_cancelled());
//! token.cancel_with_reason(CancellationReason::Shutdown);
//! assert!(observer.is_cancelled());
//! assert_eq!(observer.reason(), Some(CancellationReason::Shutdown));
//! ```

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reason for cancellation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancellationReason {
    /// Explicitly cancelled via `cancel()`
    Manual,
    /// The owning pool is shutting down
    Shutdown,
    /// The owning pool failed to initialize and is retiring the workers it
    /// already spawned
    InitRollback,
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationReason::Manual => write!(f, "manually cancelled"),
            CancellationReason::Shutdown => write!(f, "pool shutdown"),
            CancellationReason::InitRollback => write!(f, "init rollback"),
        }
    }
}

#[derive(Debug)]
struct CancellationTokenInner {
    cancelled: AtomicBool,
    reason: RwLock<Option<CancellationReason>>,
}

/// A thread-safe cancellation flag shared between a worker and its pool
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationTokenInner>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled)
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationTokenInner {
                cancelled: AtomicBool::new(false),
                reason: RwLock::new(None),
            }),
        }
    }

    /// Cancel the token
    pub fn cancel(&self) {
        self.cancel_with_reason(CancellationReason::Manual);
    }

    /// Cancel the token, recording why.
    ///
    /// Only the first cancellation records its reason.
    pub fn cancel_with_reason(&self, reason: CancellationReason) {
        let mut slot = self.inner.reason.write();
        if slot.is_none() {
            *slot = Some(reason);
        }
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Get the cancellation reason, if cancelled
    pub fn reason(&self) -> Option<CancellationReason> {
        self.inner.reason.read().clone()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
