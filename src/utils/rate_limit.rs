// src/utils/rate_limit.rs
// Fixed-window rate limiting for upstream-facing calls. Windows are discrete:
// a bucket is replaced wholesale once its window elapses, which permits a
// short burst across a window boundary — an accepted trade-off of the scheme.

use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Bucket {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Option<Duration>,
}

/// Per-key call counter over non-overlapping time windows. Buckets are
/// created lazily on first use.
pub struct FixedWindowRateLimiter {
    window: Duration,
    max: u32,
    buckets: HashMap<String, Bucket>,
}

impl FixedWindowRateLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            buckets: HashMap::new(),
        }
    }

    /// Record a call for `key` and decide whether it is allowed. Denials
    /// report the time remaining until the window resets.
    pub fn check(&mut self, key: &str) -> RateLimitDecision {
        let now = Instant::now();

        let needs_fresh_bucket = match self.buckets.get(key) {
            None => true,
            Some(bucket) => bucket.reset_at <= now,
        };

        if needs_fresh_bucket {
            self.buckets.insert(
                key.to_string(),
                Bucket {
                    count: 1,
                    reset_at: now + self.window,
                },
            );
            return RateLimitDecision {
                allowed: true,
                remaining: self.max.saturating_sub(1),
                retry_after: None,
            };
        }

        let bucket = self.buckets.get_mut(key).expect("bucket exists");
        bucket.count += 1;
        if bucket.count > self.max {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after: Some(bucket.reset_at.saturating_duration_since(now)),
            };
        }

        RateLimitDecision {
            allowed: true,
            remaining: self.max - bucket.count,
            retry_after: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_allows_exactly_max_calls_per_window() {
        let mut limiter = FixedWindowRateLimiter::new(Duration::from_secs(60), 3);
        for remaining in [2, 1, 0] {
            let decision = limiter.check("k");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, remaining);
        }
        let denied = limiter.check("k");
        assert!(!denied.allowed);
        assert!(denied.retry_after.unwrap() > Duration::ZERO);
    }

    #[test]
    fn test_fresh_window_readmits() {
        let mut limiter = FixedWindowRateLimiter::new(Duration::from_millis(10), 1);
        assert!(limiter.check("k").allowed);
        assert!(!limiter.check("k").allowed);
        sleep(Duration::from_millis(25));
        assert!(limiter.check("k").allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut limiter = FixedWindowRateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check("a").allowed);
        assert!(limiter.check("b").allowed);
        assert!(!limiter.check("a").allowed);
    }
}
