//! Process-local counter store.

use super::service::{CounterResult, CounterStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Slot {
    count: i64,
    expires_at: Option<Instant>,
}

impl Slot {
    const EMPTY: Slot = Slot {
        count: 0,
        expires_at: None,
    };

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Counter store held in process memory.
///
/// Each key is updated under its `DashMap` entry lock, so operations are atomic
/// within one process only. Used by tests and by single-instance development
/// setups without Redis; counters are not shared between instances.
///
/// Expiry follows `tokio::time`, so tests can move across windows with a
/// paused clock.
#[derive(Default)]
pub struct MemoryCounterStore {
    slots: DashMap<String, Slot>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        debug!("Using MemoryCounterStore (counters are process-local)");
        Self::default()
    }

    /// Remaining time-to-live of a live counter.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.slots
            .get(key)
            .filter(|slot| slot.is_live(now))
            .and_then(|slot| slot.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Drops every expired counter.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.slots.retain(|_, slot| slot.is_live(now));
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str) -> CounterResult<i64> {
        let now = Instant::now();
        let mut slot = self.slots.entry(key.to_string()).or_insert(Slot::EMPTY);

        if !slot.is_live(now) {
            *slot = Slot::EMPTY;
        }
        slot.count += 1;

        Ok(slot.count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()> {
        let now = Instant::now();
        if let Some(mut slot) = self.slots.get_mut(key)
            && slot.is_live(now)
        {
            slot.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn expire_if_persistent(&self, key: &str, ttl: Duration) -> CounterResult<bool> {
        let now = Instant::now();
        match self.slots.get_mut(key) {
            Some(mut slot) if slot.expires_at.is_none() => {
                slot.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let now = Instant::now();
        let found = self.slots.get(key).map(|slot| *slot);

        match found {
            Some(slot) if slot.is_live(now) => Ok(Some(slot.count)),
            Some(_) => {
                self.slots.remove_if(key, |_, slot| !slot.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CounterResult<()> {
        self.slots.remove(key);
        Ok(())
    }

    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64> {
        let now = Instant::now();
        let mut slot = self.slots.entry(key.to_string()).or_insert(Slot::EMPTY);

        if !slot.is_live(now) {
            *slot = Slot::EMPTY;
        }
        slot.count += 1;
        slot.expires_at = Some(now + ttl);

        Ok(slot.count)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
