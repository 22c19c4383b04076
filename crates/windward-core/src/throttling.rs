//! Provider rate-limit policies and the throttling gate.
//!
//! External sources are rate limited; the live-quote reconciliation tier
//! asks this gate before every per-symbol call. A symbol that cannot get
//! budget is skipped for this pass, never queued behind a blocking wait.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::ProviderId;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Static per-provider quota description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl ProviderPolicy {
    pub fn yahoo_default() -> Self {
        Self {
            provider_id: ProviderId::Yahoo,
            quota_window: Duration::from_secs(60),
            quota_limit: 60,
        }
    }

    pub fn twse_default() -> Self {
        Self {
            provider_id: ProviderId::Twse,
            quota_window: Duration::from_secs(60),
            quota_limit: 30,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Yahoo => Self::yahoo_default(),
            ProviderId::Twse => Self::twse_default(),
        }
    }
}

/// In-memory rate-budget gate backed by `governor`.
#[derive(Clone)]
pub struct ThrottlingQueue {
    limiter: Arc<DirectRateLimiter>,
    retry_after: Duration,
}

impl ThrottlingQueue {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let limit = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);
        let replenish = quota_window
            .checked_div(limit.get())
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(1));
        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_minute(limit))
            .allow_burst(limit);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            retry_after: replenish,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit)
    }

    /// Take one unit of rate budget if available.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Suggested delay before asking again once budget ran out.
    pub const fn retry_after(&self) -> Duration {
        self.retry_after
    }
}
