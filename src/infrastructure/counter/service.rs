//! Counter store trait and error types.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Errors that can occur while talking to the counter store.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("Counter store connection error: {0}")]
    ConnectionError(String),
    #[error("Counter store operation error: {0}")]
    OperationError(String),
    #[error("Counter store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for counter operations.
pub type CounterResult<T> = Result<T, CounterError>;

/// Atomic per-key counters with expiry.
///
/// All shared limiter state lives behind this trait. Implementations must make
/// each operation atomic per key across concurrent callers, including callers
/// in other server instances sharing the same backend. Callers never lock.
///
/// # Implementations
///
/// - [`crate::infrastructure::counter::RedisCounterStore`] - Redis `INCR`/`PEXPIRE`/`MULTI`
/// - [`crate::infrastructure::counter::MemoryCounterStore`] - process-local, tests and dev
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments the counter at `key`, creating it at 1 if absent or expired.
    async fn increment(&self, key: &str) -> CounterResult<i64>;

    /// Sets the time-to-live of an existing counter. No-op for absent keys.
    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()>;

    /// Sets the time-to-live only if the counter exists without one.
    ///
    /// Returns `true` when an expiry was added.
    async fn expire_if_persistent(&self, key: &str, ttl: Duration) -> CounterResult<bool>;

    /// Reads the counter; `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &str) -> CounterResult<Option<i64>>;

    /// Removes the counter.
    async fn delete(&self, key: &str) -> CounterResult<()>;

    /// Increments and (re)sets the time-to-live as one atomic batch.
    ///
    /// Either both effects are applied or neither is.
    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64>;

    /// Checks that the backend answers.
    async fn health_check(&self) -> bool;
}

/// Bounds a counter call by `timeout`, mapping expiry to [`CounterError::Timeout`].
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> CounterResult<T>
where
    F: Future<Output = CounterResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(CounterError::Timeout(timeout)))
}
