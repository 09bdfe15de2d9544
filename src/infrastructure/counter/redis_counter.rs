//! Redis-backed counter store.

use super::service::{CounterError, CounterResult, CounterStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Counter store on top of Redis.
///
/// Uses `ConnectionManager` for reconnecting, multiplexed connections. Unlike
/// a cache this store does not swallow errors: the limiters decide what a
/// failure means through their failure policy.
pub struct RedisCounterStore {
    client: ConnectionManager,
}

impl RedisCounterStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CounterResult<Self> {
        info!("Connecting to Redis counter store");

        let client = Client::open(redis_url).map_err(|e| {
            CounterError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CounterError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CounterError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self { client: manager })
    }
}

fn op_error(command: &str, key: &str, e: redis::RedisError) -> CounterError {
    CounterError::OperationError(format!("{} {}: {}", command, key, e))
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1)
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> CounterResult<i64> {
        let mut conn = self.client.clone();
        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| op_error("INCR", key, e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()> {
        let mut conn = self.client.clone();
        conn.pexpire::<_, ()>(key, ttl_millis(ttl))
            .await
            .map_err(|e| op_error("PEXPIRE", key, e))
    }

    async fn expire_if_persistent(&self, key: &str, ttl: Duration) -> CounterResult<bool> {
        let mut conn = self.client.clone();
        // PTTL: -1 = no expiry, -2 = missing
        let remaining = conn
            .pttl::<_, i64>(key)
            .await
            .map_err(|e| op_error("PTTL", key, e))?;
        if remaining != -1 {
            return Ok(false);
        }

        conn.pexpire::<_, bool>(key, ttl_millis(ttl))
            .await
            .map_err(|e| op_error("PEXPIRE", key, e))
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let mut conn = self.client.clone();
        conn.get::<_, Option<i64>>(key)
            .await
            .map_err(|e| op_error("GET", key, e))
    }

    async fn delete(&self, key: &str) -> CounterResult<()> {
        let mut conn = self.client.clone();
        let deleted = conn
            .del::<_, i64>(key)
            .await
            .map_err(|e| op_error("DEL", key, e))?;

        if deleted > 0 {
            debug!("Counter cleared: {}", key);
        }
        Ok(())
    }

    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64> {
        let mut conn = self.client.clone();

        // MULTI / INCR / PEXPIRE / EXEC
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .pexpire(key, ttl_millis(ttl))
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| op_error("MULTI", key, e))?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
