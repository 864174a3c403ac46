// Event Publisher Port (message broker)

use crate::domain::RabbitmqMessage;
use crate::error::Result;
use async_trait::async_trait;

/// Delivers envelopes to the message broker.
///
/// Implementations must return `Ok` only once the broker accepted the
/// message; any error leaves the outbox entry pending for a retry.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, message: &RabbitmqMessage<serde_json::Value>) -> Result<()>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records published envelopes; can be told to fail the next N calls
    #[derive(Default)]
    pub struct RecordingPublisher {
        published: Mutex<Vec<RabbitmqMessage<serde_json::Value>>>,
        failures_left: AtomicUsize,
    }

    impl RecordingPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(times: usize) -> Self {
            let publisher = Self::default();
            publisher.failures_left.store(times, Ordering::SeqCst);
            publisher
        }

        pub fn published(&self) -> Vec<RabbitmqMessage<serde_json::Value>> {
            self.published.lock().map(|p| p.clone()).unwrap_or_default()
        }

        pub fn topics(&self) -> Vec<String> {
            self.published()
                .iter()
                .map(|m| m.topic().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, message: &RabbitmqMessage<serde_json::Value>) -> Result<()> {
            let should_fail = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(AppError::Publish("broker unavailable".to_string()));
            }
            self.published
                .lock()
                .map_err(|_| AppError::Internal("publisher lock poisoned".to_string()))?
                .push(message.clone());
            Ok(())
        }
    }
}
