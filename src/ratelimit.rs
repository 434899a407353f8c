//! Per-client token bucket rate limiting for the HTTP surface.
//!
//! Buckets are created lazily on first sight of a client identity and live
//! for the lifetime of the process; this is bounded in practice by the
//! number of distinct clients seen, which is acceptable for the expected
//! deployment scale of this service.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(burst: u32) -> Self {
        Self {
            tokens: burst as f64,
            last_refill: Instant::now(),
        }
    }

    fn try_take(&mut self, burst: u32, refill_interval: Duration) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let refill_rate = 1.0 / refill_interval.as_secs_f64();
        self.tokens = (self.tokens + elapsed.as_secs_f64() * refill_rate).min(burst as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    burst: u32,
    refill_interval: Duration,
}

impl RateLimiter {
    pub fn new(burst: u32, refill_interval: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            burst,
            refill_interval,
        }
    }

    /// Returns `true` if the request for `client_id` may proceed.
    pub fn check(&self, client_id: &str) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry(client_id.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst));
        bucket.try_take(self.burst, self.refill_interval)
    }
}
