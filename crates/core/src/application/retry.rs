// Retry logic for outbox delivery
use crate::domain::OutboxEntry;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again at the given epoch ms
    RetryAt(i64),
    /// Attempts exhausted, park the entry as failed
    GiveUp,
}

/// Exponential backoff policy
///
/// delay = base_delay * 2^attempts, capped at `max_delay_ms`,
/// with a deterministic ±10% jitter derived from the entry id.
pub struct RetryPolicy {
    base_delay_ms: i64,
    max_delay_ms: i64,
}

impl RetryPolicy {
    pub fn new(base_delay_ms: i64, max_delay_ms: i64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms: max_delay_ms.max(base_delay_ms),
        }
    }

    /// Decide what happens after a failed attempt on `entry`
    ///
    /// `entry.attempts` counts attempts made *before* the one that just failed.
    pub fn decide(&self, entry: &OutboxEntry, now_millis: i64) -> RetryDecision {
        let attempts_made = entry.attempts + 1;
        if attempts_made >= entry.max_attempts {
            warn!(
                outbox_id = %entry.id,
                attempts = attempts_made,
                max_attempts = entry.max_attempts,
                "Max delivery attempts reached"
            );
            return RetryDecision::GiveUp;
        }

        let delay_ms = self.delay_for(&entry.id, entry.attempts);

        info!(
            outbox_id = %entry.id,
            attempt = attempts_made,
            delay_ms = delay_ms,
            "Scheduling delivery retry"
        );

        RetryDecision::RetryAt(now_millis + delay_ms)
    }

    fn delay_for(&self, id: &str, attempts: i32) -> i64 {
        let exp = attempts.clamp(0, 30) as u32;
        let raw = self.base_delay_ms.saturating_mul(1i64 << exp);
        let capped = raw.min(self.max_delay_ms) as f64;

        // Spread retries of entries that failed together
        let jitter_seed = id.chars().map(|c| c as u32).sum::<u32>();
        let jitter_factor = 0.9 + ((jitter_seed % 21) as f64 / 100.0); // 0.9 to 1.1

        // Jitter never pushes past the cap
        ((capped * jitter_factor) as i64).min(self.max_delay_ms)
    }
}
