//! Failed-login lockout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::config::{FailurePolicy, LimitSettings};
use crate::infrastructure::counter::{CounterStore, with_timeout};

/// Lockout state of one client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked { failures: i64 },
    Locked { failures: i64 },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }
}

/// Tracks failed logins per client key.
///
/// The check never counts; only [`LoginAttemptLimiter::record_failure`] does,
/// and the authentication handler calls it when credentials are rejected. A
/// key stays locked until its window expires in the store or a successful
/// login clears it.
pub struct LoginAttemptLimiter {
    store: Arc<dyn CounterStore>,
    settings: LimitSettings,
    policy: FailurePolicy,
    timeout: Duration,
}

impl LoginAttemptLimiter {
    const KEY_PREFIX: &'static str = "login_attempts:";

    pub fn new(
        store: Arc<dyn CounterStore>,
        settings: LimitSettings,
        policy: FailurePolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            settings,
            policy,
            timeout,
        }
    }

    fn build_key(&self, client_key: &str) -> String {
        format!("{}{}", Self::KEY_PREFIX, client_key)
    }

    fn limit(&self) -> i64 {
        i64::try_from(self.settings.limit).unwrap_or(i64::MAX)
    }

    /// Reads the failure count; locked at or above the limit.
    pub async fn check_allowed(&self, client_key: &str) -> LockState {
        let key = self.build_key(client_key);

        match with_timeout(self.timeout, self.store.get(&key)).await {
            Ok(count) => {
                let failures = count.unwrap_or(0);
                if failures >= self.limit() {
                    LockState::Locked { failures }
                } else {
                    LockState::Unlocked { failures }
                }
            }
            Err(e) => {
                metrics::counter!("counter_store_errors_total", "limiter" => "login")
                    .increment(1);
                error!(key = %key, error = %e, policy = ?self.policy, "Login limiter store unavailable");
                match self.policy {
                    FailurePolicy::Open => LockState::Unlocked { failures: 0 },
                    FailurePolicy::Closed => LockState::Locked { failures: 0 },
                }
            }
        }
    }

    /// Counts one failed login and restarts the lockout window.
    ///
    /// Increment and expiry go to the store as one atomic batch. Returns the
    /// new count, or `None` if the store could not be reached.
    pub async fn record_failure(&self, client_key: &str) -> Option<i64> {
        let key = self.build_key(client_key);

        match with_timeout(
            self.timeout,
            self.store.increment_with_expiry(&key, self.settings.window),
        )
        .await
        {
            Ok(failures) => {
                if failures == self.limit() {
                    metrics::counter!("login_lockouts_total").increment(1);
                    warn!(key = %key, failures, "Login lockout engaged");
                }
                Some(failures)
            }
            Err(e) => {
                metrics::counter!("counter_store_errors_total", "limiter" => "login")
                    .increment(1);
                error!(key = %key, error = %e, "Failed to record login failure");
                None
            }
        }
    }

    /// Forgets all recorded failures for `client_key`.
    pub async fn clear_on_success(&self, client_key: &str) {
        let key = self.build_key(client_key);

        if let Err(e) = with_timeout(self.timeout, self.store.delete(&key)).await {
            metrics::counter!("counter_store_errors_total", "limiter" => "login").increment(1);
            warn!(key = %key, error = %e, "Failed to clear login failures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::counter::{CounterError, MemoryCounterStore, MockCounterStore};

    const TIMEOUT: Duration = Duration::from_millis(250);

    fn limiter(store: Arc<dyn CounterStore>, limit: u64, policy: FailurePolicy) -> LoginAttemptLimiter {
        LoginAttemptLimiter::new(
            store,
            LimitSettings {
                limit,
                window: Duration::from_secs(900),
            },
            policy,
            TIMEOUT,
        )
    }

    fn unreachable_store() -> MockCounterStore {
        let mut store = MockCounterStore::new();
        store
            .expect_get()
            .returning(|_| Err(CounterError::ConnectionError("refused".to_string())));
        store
            .expect_increment_with_expiry()
            .returning(|_, _| Err(CounterError::ConnectionError("refused".to_string())));
        store
            .expect_delete()
            .returning(|_| Err(CounterError::ConnectionError("refused".to_string())));
        store
    }

    #[tokio::test]
    async fn test_three_failures_lock_then_clear_unlocks() {
        let limiter = limiter(Arc::new(MemoryCounterStore::new()), 3, FailurePolicy::Open);

        assert_eq!(
            limiter.check_allowed("u1").await,
            LockState::Unlocked { failures: 0 }
        );

        for expected in 1..=3 {
            assert_eq!(limiter.record_failure("u1").await, Some(expected));
        }

        assert_eq!(
            limiter.check_allowed("u1").await,
            LockState::Locked { failures: 3 }
        );

        limiter.clear_on_success("u1").await;

        assert_eq!(
            limiter.check_allowed("u1").await,
            LockState::Unlocked { failures: 0 }
        );
    }

    #[tokio::test]
    async fn test_check_does_not_count() {
        let limiter = limiter(Arc::new(MemoryCounterStore::new()), 1, FailurePolicy::Open);

        for _ in 0..10 {
            assert!(!limiter.check_allowed("u1").await.is_locked());
        }
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(Arc::new(MemoryCounterStore::new()), 2, FailurePolicy::Open);

        limiter.record_failure("u1").await;
        limiter.record_failure("u1").await;

        assert!(limiter.check_allowed("u1").await.is_locked());
        assert!(!limiter.check_allowed("u2").await.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_expires_with_window() {
        let limiter = limiter(Arc::new(MemoryCounterStore::new()), 2, FailurePolicy::Open);

        limiter.record_failure("u1").await;
        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.record_failure("u1").await;
        assert!(limiter.check_allowed("u1").await.is_locked());

        // Each failure restarts the window
        tokio::time::advance(Duration::from_secs(600)).await;
        assert!(limiter.check_allowed("u1").await.is_locked());

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(
            limiter.check_allowed("u1").await,
            LockState::Unlocked { failures: 0 }
        );
    }

    #[tokio::test]
    async fn test_failure_uses_atomic_batch_only() {
        let mut store = MockCounterStore::new();
        store
            .expect_increment_with_expiry()
            .withf(|key, ttl| key == "login_attempts:u1" && *ttl == Duration::from_secs(900))
            .times(1)
            .returning(|_, _| Ok(1));
        store.expect_increment().times(0);
        store.expect_expire().times(0);

        let limiter = limiter(Arc::new(store), 3, FailurePolicy::Open);

        assert_eq!(limiter.record_failure("u1").await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_leaves_no_partial_state() {
        let store = Arc::new(MemoryCounterStore::new());
        let limiter = limiter(store.clone(), 3, FailurePolicy::Open);

        limiter.record_failure("u1").await;

        // Count and expiry land together
        assert_eq!(store.get("login_attempts:u1").await.unwrap(), Some(1));
        assert_eq!(store.ttl("login_attempts:u1"), Some(Duration::from_secs(900)));

        let failing = limiter_with_failing_batch();
        assert_eq!(failing.record_failure("u1").await, None);
    }

    fn limiter_with_failing_batch() -> LoginAttemptLimiter {
        let mut store = MockCounterStore::new();
        store
            .expect_increment_with_expiry()
            .returning(|_, _| Err(CounterError::OperationError("EXECABORT".to_string())));
        store.expect_increment().times(0);
        store.expect_expire().times(0);
        limiter(Arc::new(store), 3, FailurePolicy::Open)
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_open() {
        let limiter = limiter(Arc::new(unreachable_store()), 3, FailurePolicy::Open);

        assert!(!limiter.check_allowed("u1").await.is_locked());
        assert_eq!(limiter.record_failure("u1").await, None);
        limiter.clear_on_success("u1").await;
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_closed_when_configured() {
        let limiter = limiter(Arc::new(unreachable_store()), 3, FailurePolicy::Closed);

        assert!(limiter.check_allowed("u1").await.is_locked());
    }
}
