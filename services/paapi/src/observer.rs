use log::{debug, info, warn};
use std::fmt::Debug;
use std::time::Duration;

/// Points in the life of one `execute` call that callers may observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// The response was served from the cache; no request was sent.
    CacheHit {
        /// Fingerprint of the payload.
        fingerprint: &'a str,
    },
    /// A request is about to be signed and sent.
    Attempt {
        /// 1-based attempt number.
        attempt: u32,
        /// Configured attempt budget.
        max_attempts: u32,
    },
    /// Upstream answered `TooManyRequests`.
    Throttled {
        /// Attempt that was throttled.
        attempt: u32,
        /// Configured attempt budget.
        max_attempts: u32,
        /// Delay before the next attempt, zero when none is left.
        delay: Duration,
    },
    /// A fresh result was written to the cache.
    CacheStored {
        /// Fingerprint of the payload.
        fingerprint: &'a str,
    },
}

/// Observe receives executor events.
///
/// Implementations must be cheap; they run inline on the request path.
pub trait Observe: Debug + Send + Sync + 'static {
    /// Handle one event.
    fn observe(&self, event: &Event<'_>);
}

/// LogObserver writes every event to `log`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observe for LogObserver {
    fn observe(&self, event: &Event<'_>) {
        match event {
            Event::CacheHit { fingerprint } => debug!("cache matched: {fingerprint}"),
            Event::Attempt {
                attempt,
                max_attempts,
            } => debug!("attempt {attempt}/{max_attempts}"),
            Event::Throttled {
                attempt,
                max_attempts,
                delay,
            } if attempt < max_attempts => warn!(
                "TooManyRequests on attempt {attempt}/{max_attempts}, retry after {delay:?}"
            ),
            Event::Throttled { max_attempts, .. } => {
                warn!("TooManyRequests on final attempt {max_attempts}, giving up")
            }
            Event::CacheStored { fingerprint } => info!("cache saved: {fingerprint}"),
        }
    }
}
