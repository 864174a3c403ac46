use async_trait::async_trait;
use serde_json::Value;
use taskhub_core::domain::RabbitmqMessage;
use taskhub_core::error::Result;
use taskhub_core::port::EventPublisher;
use tracing::info;

/// Logs envelopes instead of publishing (broker disabled)
#[derive(Debug, Default)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, message: &RabbitmqMessage<Value>) -> Result<()> {
        info!(
            topic = %message.topic(),
            payload = %message.payload(),
            "Event (broker disabled)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let publisher = TracingPublisher;
        let message = RabbitmqMessage::new("task.created", serde_json::json!({"id": "t-1"}));
        publisher.publish(&message).await.unwrap();
    }
}
