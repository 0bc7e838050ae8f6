//! Error types for the pool monitor

use crate::pool::PoolState;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the pool monitor
///
/// Every failure is reported synchronously through the failing call's return
/// value. None of them are retried internally.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// `init` was called while the pool was running or shutting down
    #[error("Pool '{pool_name}' is already initialized (state: {state})")]
    AlreadyInitialized {
        /// Name of the pool
        pool_name: String,
        /// State observed at the time of the call
        state: PoolState,
    },

    /// `submit` or `shutdown` was called on an uninitialized pool
    #[error("Pool '{pool_name}' is not initialized")]
    NotInitialized {
        /// Name of the pool
        pool_name: String,
    },

    /// `submit` or `shutdown` was called while a shutdown is in progress
    #[error("Pool '{pool_name}' is shutting down")]
    ShuttingDown {
        /// Name of the pool
        pool_name: String,
    },

    /// Queue is full; the rejected job has been dropped
    #[error("Job queue is full: {current}/{max} jobs queued")]
    QueueFull {
        /// Current queue size
        current: usize,
        /// Queue capacity
        max: usize,
    },

    /// A resource needed by `init` could not be allocated
    #[error("Failed to allocate {resource}: {message}")]
    AllocationFailure {
        /// What was being allocated
        resource: String,
        /// Error message
        message: String,
        /// Source IO error (thread spawn failures)
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// A worker thread terminated abnormally and could not be joined
    #[error("Worker thread #{worker_id} panicked: {message}")]
    WorkerPanic {
        /// ID of the panicked worker
        worker_id: usize,
        /// Panic message
        message: String,
    },
}

impl PoolError {
    /// Create an already initialized error
    pub fn already_initialized(pool_name: impl Into<String>, state: PoolState) -> Self {
        PoolError::AlreadyInitialized {
            pool_name: pool_name.into(),
            state,
        }
    }

    /// Create a not initialized error
    pub fn not_initialized(pool_name: impl Into<String>) -> Self {
        PoolError::NotInitialized {
            pool_name: pool_name.into(),
        }
    }

    /// Create a shutting down error
    pub fn shutting_down(pool_name: impl Into<String>) -> Self {
        PoolError::ShuttingDown {
            pool_name: pool_name.into(),
        }
    }

    /// Create a queue full error
    pub fn queue_full(current: usize, max: usize) -> Self {
        PoolError::QueueFull { current, max }
    }

    /// Create an allocation failure error
    pub fn allocation(resource: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::AllocationFailure {
            resource: resource.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an allocation failure error caused by an IO error
    pub fn allocation_with_source(
        resource: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::AllocationFailure {
            resource: resource.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::WorkerPanic {
            worker_id,
            message: message.into(),
        }
    }

    /// Whether the caller can reasonably retry the same call later.
    ///
    /// Only a saturated queue qualifies; every other error reflects a
    /// lifecycle or resource problem the caller has to resolve first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PoolError::QueueFull { .. })
    }
}
