//! Fixed-window request admission.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::{FailurePolicy, LimitSettings};
use crate::infrastructure::counter::{CounterStore, with_timeout};

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    pub limit: u64,
    /// Post-increment count; `None` when the store could not be consulted.
    pub count: Option<i64>,
}

impl Admission {
    /// `limit - count`, negative when concurrent increments overshoot.
    pub fn raw_remaining(&self) -> i64 {
        let limit = i64::try_from(self.limit).unwrap_or(i64::MAX);
        match self.count {
            Some(count) => limit.saturating_sub(count),
            None => limit,
        }
    }

    /// Remaining quota clamped at zero, for response headers.
    pub fn remaining(&self) -> u64 {
        u64::try_from(self.raw_remaining()).unwrap_or(0)
    }
}

/// Counts requests per client key in fixed windows.
///
/// The window opens on the first request after the previous one expired and
/// lasts `window`; there is no sliding, so bursts straddling a window edge are
/// accepted. Counting is delegated to the store's atomic increment.
pub struct RequestLimiter {
    store: Arc<dyn CounterStore>,
    settings: LimitSettings,
    policy: FailurePolicy,
    timeout: Duration,
}

impl RequestLimiter {
    const KEY_PREFIX: &'static str = "rate_limit:";

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

    pub fn limit(&self) -> u64 {
        self.settings.limit
    }

    fn build_key(&self, client_key: &str) -> String {
        format!("{}{}", Self::KEY_PREFIX, client_key)
    }

    /// Counts one request for `client_key` and decides whether it may pass.
    ///
    /// The window expiry is set only by the increment that created the
    /// counter. When the store fails or times out the configured
    /// [`FailurePolicy`] decides.
    pub async fn admit(&self, client_key: &str) -> Admission {
        let key = self.build_key(client_key);
        let limit = self.settings.limit;

        let count = match with_timeout(self.timeout, self.store.increment(&key)).await {
            Ok(count) => count,
            Err(e) => {
                metrics::counter!("counter_store_errors_total", "limiter" => "request")
                    .increment(1);
                error!(key = %key, error = %e, policy = ?self.policy, "Rate limiter store unavailable");
                return Admission {
                    allowed: self.policy == FailurePolicy::Open,
                    limit,
                    count: None,
                };
            }
        };

        if count == 1
            && let Err(e) =
                with_timeout(self.timeout, self.store.expire(&key, self.settings.window)).await
        {
            metrics::counter!("counter_store_errors_total", "limiter" => "request").increment(1);
            warn!(key = %key, error = %e, "Failed to set rate limit window expiry");
        }

        let allowed = count <= i64::try_from(limit).unwrap_or(i64::MAX);
        if !allowed {
            metrics::counter!("rate_limit_rejected_total").increment(1);
            debug!(key = %key, count, limit, "Rate limit exceeded");
            self.restore_missing_window(&key).await;
        }

        Admission {
            allowed,
            limit,
            count: Some(count),
        }
    }

    /// A counter whose first-increment expiry failed never resets on its own.
    /// Rejected requests put the window back so the client is not locked out
    /// indefinitely; counters that already expire are left untouched.
    async fn restore_missing_window(&self, key: &str) {
        match with_timeout(
            self.timeout,
            self.store.expire_if_persistent(key, self.settings.window),
        )
        .await
        {
            Ok(true) => warn!(key = %key, "Rate limit counter had no expiry, window restored"),
            Ok(false) => {}
            Err(e) => {
                metrics::counter!("counter_store_errors_total", "limiter" => "request")
                    .increment(1);
                warn!(key = %key, error = %e, "Failed to check rate limit window expiry");
            }
        }
    }
}
