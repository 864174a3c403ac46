// Outbox Relay - delivers staged domain events to the broker

pub mod constants;
mod shutdown;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::domain::OutboxEntry;
use crate::error::Result;
use crate::port::{EventPublisher, OutboxRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Relay tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub batch_size: i64,
    pub retry_base_delay_ms: i64,
    pub retry_max_delay_ms: i64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

/// Outcome of one relay pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayPass {
    pub delivered: usize,
    pub rescheduled: usize,
    pub failed: usize,
}

impl RelayPass {
    pub fn is_idle(&self) -> bool {
        self.delivered + self.rescheduled + self.failed == 0
    }
}

pub struct OutboxRelay {
    outbox: Arc<dyn OutboxRepository>,
    publisher: Arc<dyn EventPublisher>,
    retry_policy: RetryPolicy,
    time_provider: Arc<dyn TimeProvider>,
    batch_size: i64,
}

impl OutboxRelay {
    pub fn new(
        outbox: Arc<dyn OutboxRepository>,
        publisher: Arc<dyn EventPublisher>,
        time_provider: Arc<dyn TimeProvider>,
        config: RelayConfig,
    ) -> Self {
        Self {
            outbox,
            publisher,
            retry_policy: RetryPolicy::new(config.retry_base_delay_ms, config.retry_max_delay_ms),
            time_provider,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Run relay loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(batch_size = self.batch_size, "Outbox relay started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            match self.relay_once().await {
                Ok(pass) if !pass.is_idle() => continue,
                Ok(_) => {
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => break,
                    }
                }
                Err(e) => {
                    error!(error = %e, "Outbox relay error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => break,
                    }
                }
            }
        }
        info!("Outbox relay stopped");
        Ok(())
    }

    /// Deliver one batch of due entries, oldest first.
    ///
    /// A failing entry is rescheduled (or parked) and does not stop the
    /// remaining entries of the batch.
    pub async fn relay_once(&self) -> Result<RelayPass> {
        let now = self.time_provider.now_millis();
        let due = self.outbox.find_due(now, self.batch_size).await?;

        let mut pass = RelayPass::default();
        for mut entry in due {
            match self.publisher.publish(&entry.to_message()).await {
                Ok(()) => {
                    entry.mark_delivered(self.time_provider.now_millis());
                    self.outbox.update(&entry).await?;
                    debug!(outbox_id = %entry.id, topic = %entry.topic, "Event delivered");
                    pass.delivered += 1;
                }
                Err(e) => {
                    if self.handle_failure(&mut entry, e.to_string()).await? {
                        pass.rescheduled += 1;
                    } else {
                        pass.failed += 1;
                    }
                }
            }
        }
        Ok(pass)
    }

    /// Returns true when the entry was rescheduled, false when parked
    async fn handle_failure(&self, entry: &mut OutboxEntry, reason: String) -> Result<bool> {
        let now = self.time_provider.now_millis();
        let rescheduled = match self.retry_policy.decide(entry, now) {
            RetryDecision::RetryAt(at) => {
                warn!(
                    outbox_id = %entry.id,
                    topic = %entry.topic,
                    error = %reason,
                    "Event delivery failed, will retry"
                );
                entry.record_failure(reason, at);
                true
            }
            RetryDecision::GiveUp => {
                error!(
                    outbox_id = %entry.id,
                    topic = %entry.topic,
                    attempts = entry.attempts + 1,
                    error = %reason,
                    "Event delivery failed permanently"
                );
                entry.mark_failed(reason, now);
                false
            }
        };
        self.outbox.update(entry).await?;
        Ok(rescheduled)
    }
}
