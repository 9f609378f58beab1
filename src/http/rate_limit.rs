//! Rate limiting for source API calls
//!
//! The source API tolerates one call per fixed interval rather than a
//! request budget, so the governor quota is expressed as a single permit
//! per period with no burst: `wait()` suspends until the minimum spacing
//! since the previous permitted call has elapsed.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Minimum spacing the source API expects between calls
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Minimum-interval rate limiter.
///
/// The last-call state lives inside this instance (shared across clones via
/// `Arc`), never in module-level state, so independent runs and tests do not
/// pace each other.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>>,
}

impl RateLimiter {
    /// A limiter enforcing the given minimum spacing between calls.
    ///
    /// A zero interval yields a no-op limiter.
    pub fn spaced(min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval)
            .map(|quota| Arc::new(Governor::direct(quota.allow_burst(NonZeroU32::MIN))));
        Self { limiter }
    }

    /// A limiter that never delays; used by tests and one-shot probes
    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    /// Suspend until a call is permitted. The first call on a fresh limiter
    /// proceeds immediately.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Whether a call would be permitted right now, consuming the permit if
    /// so
    pub fn check(&self) -> bool {
        self.limiter
            .as_ref()
            .map_or(true, |limiter| limiter.check().is_ok())
    }

    /// Whether this limiter actually paces calls
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::spaced(DEFAULT_MIN_INTERVAL)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
