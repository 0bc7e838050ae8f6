//! Configuration for the thread pool

use crate::core::{PoolError, Result};
use serde::{Deserialize, Serialize};

/// Default number of job slots in the queue
pub const DEFAULT_CAPACITY: usize = 100;

/// Configuration applied by [`ThreadPool::init_with_config`]
///
/// Missing fields fall back to [`Default`] when loaded from JSON.
///
/// ```rust
/// use rust_pool_monitor::ThreadPoolConfig;
///
/// let config = ThreadPoolConfig::from_json(r#"{ "pool_size": 8, "capacity": 64 }"#).unwrap();
/// assert_eq!(config.pool_size, 8);
/// assert_eq!(config.capacity, 64);
/// assert_eq!(config.thread_name_prefix, "worker");
/// ```
///
/// [`ThreadPool::init_with_config`]: crate::pool::ThreadPool::init_with_config
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolConfig {
    /// Number of worker threads
    pub pool_size: usize,
    /// Number of job slots in the bounded queue
    pub capacity: usize,
    /// Thread name prefix; workers are named `{prefix}-{id}`
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: num_cpus::get(),
            capacity: DEFAULT_CAPACITY,
            thread_name_prefix: Self::DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl ThreadPoolConfig {
    /// Prefix used when none is configured
    pub const DEFAULT_THREAD_NAME_PREFIX: &'static str = "worker";

    /// Create a new configuration with the given worker count and queue capacity
    #[must_use]
    pub fn new(pool_size: usize, capacity: usize) -> Self {
        Self {
            pool_size,
            capacity,
            thread_name_prefix: Self::DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }

    /// Set the number of worker threads
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the queue capacity
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PoolError::invalid_config("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(PoolError::invalid_config(
                "pool_size",
                "Number of workers must be greater than 0",
            ));
        }
        if self.capacity == 0 {
            return Err(PoolError::invalid_config(
                "capacity",
                "Queue capacity must be greater than 0",
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(PoolError::invalid_config(
                "thread_name_prefix",
                "Thread name prefix must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ThreadPoolConfig::default();
        assert_eq!(config.pool_size, num_cpus::get());
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_keeps_given_sizes_and_default_prefix() {
        let config = ThreadPoolConfig::new(2, 8);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.capacity, 8);
        assert_eq!(
            config.thread_name_prefix,
            ThreadPoolConfig::DEFAULT_THREAD_NAME_PREFIX
        );
    }

    #[test]
    fn test_builder() {
        let config = ThreadPoolConfig::new(2, 8)
            .with_pool_size(3)
            .with_capacity(16)
            .with_thread_name_prefix("prime");
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.capacity, 16);
        assert_eq!(config.thread_name_prefix, "prime");
    }

    #[test]
    fn test_validate_rejects_zero() {
        let err = ThreadPoolConfig::new(0, 10).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig { ref parameter, .. } if parameter == "pool_size"));

        let err = ThreadPoolConfig::new(4, 0).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig { ref parameter, .. } if parameter == "capacity"));

        let err = ThreadPoolConfig::new(4, 4)
            .with_thread_name_prefix("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_json_rejects_malformed_and_invalid() {
        assert!(matches!(
            ThreadPoolConfig::from_json("{ not json"),
            Err(PoolError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ThreadPoolConfig::from_json(r#"{ "pool_size": 0 }"#),
            Err(PoolError::InvalidConfig { .. })
        ));
    }
}
