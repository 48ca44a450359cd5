//! Fixed-window rate limiting keyed by client identity

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

/// In-memory fixed-window rate limiter. A bucket holds a counter and a
/// window end; once the window has passed, the next check recreates the
/// bucket with count 1. Single-process only - buckets are not shared
/// across instances.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            limit: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut buckets = self.buckets.lock();

        match buckets.get_mut(key) {
            Some(bucket) if bucket.reset_at > now => {
                if bucket.count >= self.limit {
                    return RateLimitDecision {
                        admitted: false,
                        remaining: 0,
                        reset_at: bucket.reset_at,
                    };
                }

                bucket.count += 1;
                RateLimitDecision {
                    admitted: true,
                    remaining: self.limit.saturating_sub(bucket.count),
                    reset_at: bucket.reset_at,
                }
            }
            _ => {
                let reset_at = now + self.window;
                buckets.insert(key.to_string(), Bucket { count: 1, reset_at });
                RateLimitDecision {
                    admitted: true,
                    remaining: self.limit.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Drop buckets whose window has passed. Call periodically to bound
    /// memory in a long-lived process; expired buckets are otherwise only
    /// replaced when their key is seen again.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        self.buckets.lock().retain(|_, bucket| bucket.reset_at > now);
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests: limit,
            window_secs,
        })
    }

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at("ip|mail", now);
            assert!(decision.admitted);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let fourth = limiter.check_at("ip|mail", now + Duration::from_secs(5));
        assert!(!fourth.admitted);
        assert_eq!(fourth.remaining, 0);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("key", now).admitted);
        }
        assert!(!limiter.check_at("key", now + Duration::from_secs(59)).admitted);

        let after_window = limiter.check_at("key", now + Duration::from_secs(60));
        assert!(after_window.admitted);
        assert_eq!(after_window.remaining, 2);
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("key", now).admitted);
        for i in 1..5 {
            assert!(!limiter.check_at("key", now + Duration::from_secs(i)).admitted);
        }

        // Still a single admission window; expiry recreates with count 1.
        let reset = limiter.check_at("key", now + Duration::from_secs(61));
        assert!(reset.admitted);
    }

    #[test]
    fn test_keys_are_isolated() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("1.2.3.4|a@b.co", now).admitted);
        assert!(!limiter.check_at("1.2.3.4|a@b.co", now).admitted);

        // Exhausting one key leaves others untouched.
        assert!(limiter.check_at("1.2.3.4|c@d.co", now).admitted);
        assert!(limiter.check_at("5.6.7.8|a@b.co", now).admitted);
    }

    #[test]
    fn test_reset_at_is_window_end() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        let first = limiter.check_at("key", now);
        assert_eq!(first.reset_at, now + Duration::from_secs(60));

        // Subsequent checks in the same window report the same boundary.
        let second = limiter.check_at("key", now + Duration::from_secs(10));
        assert_eq!(second.reset_at, first.reset_at);
    }

    #[test]
    fn test_sweep_expired() {
        let limiter = limiter(3, 0);
        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.sweep_expired();
        assert_eq!(limiter.tracked_keys(), 0);
    }
}
