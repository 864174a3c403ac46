//! Per-caller Rate Limiter (Token Bucket Algorithm)
//!
//! Each caller key (account id, or `anonymous` before login) owns a bucket
//! of `burst` tokens refilled at `refill_per_sec`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Key shared by every unauthenticated caller
pub const ANONYMOUS: &str = "anonymous";

/// Buckets untouched for this long are dropped on the next sweep
const IDLE_EVICTION_SECS: f64 = 600.0;
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub enabled: bool,
    pub burst: u32,
    pub refill_per_sec: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst: 200,
            refill_per_sec: 100,
        }
    }
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    config: ThrottleConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one token for `key`; false when the caller is throttled
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.config.enabled {
            return true;
        }

        let burst = self.config.burst as f64;
        let rate = self.config.refill_per_sec as f64;

        // Poisoning only happens if a holder panicked; the map is still usable
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        if buckets.len() >= SWEEP_THRESHOLD {
            buckets.retain(|_, b| {
                now.saturating_duration_since(b.last_refill).as_secs_f64() < IDLE_EVICTION_SECS
            });
        }

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: burst,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * rate).min(burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tracked caller keys (for monitoring)
    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().map(|b| b.len()).unwrap_or(0)
    }
}
