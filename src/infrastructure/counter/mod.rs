//! Atomic counter store backing the request and login limiters.
//!
//! Provides a [`CounterStore`] trait with two implementations:
//! - [`RedisCounterStore`] - shared Redis counters for production
//! - [`MemoryCounterStore`] - process-local counters for tests and development

mod memory_counter;
mod redis_counter;
mod service;

pub use memory_counter::MemoryCounterStore;
pub use redis_counter::RedisCounterStore;
pub use service::{CounterError, CounterResult, CounterStore, with_timeout};

#[cfg(test)]
pub use service::MockCounterStore;
