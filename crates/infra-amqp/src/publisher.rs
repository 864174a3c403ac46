// RabbitMQ EventPublisher

use crate::config::AmqpConfig;
use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde_json::Value;
use taskhub_core::domain::RabbitmqMessage;
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::EventPublisher;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const CONTENT_TYPE_JSON: &str = "application/json";
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Open connection plus the confirm-mode channel publishing on it
struct Link {
    connection: Connection,
    channel: Channel,
}

impl Link {
    async fn open(config: &AmqpConfig) -> Result<Self> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(|e| AppError::Publish(format!("Failed to connect to RabbitMQ: {}", e)))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| AppError::Publish(format!("Failed to create channel: {}", e)))?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                AppError::Publish(format!(
                    "Failed to declare exchange {}: {}",
                    config.exchange, e
                ))
            })?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| AppError::Publish(format!("Failed to enable confirms: {}", e)))?;

        info!(exchange = %config.exchange, "Connected to RabbitMQ");
        Ok(Self {
            connection,
            channel,
        })
    }

    fn is_usable(&self) -> bool {
        !needs_reconnect(
            self.connection.status().connected(),
            self.channel.status().connected(),
        )
    }
}

/// A link is replaced once either the connection or the channel dropped
pub(crate) fn needs_reconnect(connection_up: bool, channel_up: bool) -> bool {
    !(connection_up && channel_up)
}

/// Publishes envelopes to a durable topic exchange with publisher confirms.
///
/// The link is re-opened on the next publish after the broker went away;
/// a failed reconnect surfaces as a publish error so the relay backs off.
pub struct AmqpPublisher {
    config: AmqpConfig,
    link: Mutex<Option<Link>>,
}

impl AmqpPublisher {
    /// Connect eagerly so a bad URL fails at startup
    pub async fn connect(config: &AmqpConfig) -> Result<Self> {
        let link = Link::open(config).await?;
        Ok(Self {
            config: config.clone(),
            link: Mutex::new(Some(link)),
        })
    }

    async fn send(channel: &Channel, exchange: &str, message: &RabbitmqMessage<Value>) -> Result<()> {
        let body = serde_json::to_vec(message)?;
        let message_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp().max(0) as u64;

        let confirmation = channel
            .basic_publish(
                exchange,
                message.topic(),
                BasicPublishOptions::default(),
                &body,
                properties(message_id.clone(), timestamp),
            )
            .await
            .map_err(|e| AppError::Publish(format!("Failed to publish message: {}", e)))?
            .await
            .map_err(|e| AppError::Publish(format!("Publisher confirm failed: {}", e)))?;

        if let Confirmation::Nack(_) = confirmation {
            return Err(AppError::Publish(format!(
                "Broker rejected message {} on topic {}",
                message_id,
                message.topic()
            )));
        }

        debug!(
            exchange = %exchange,
            topic = %message.topic(),
            message_id = %message_id,
            "Published event"
        );
        Ok(())
    }
}

pub(crate) fn properties(message_id: String, timestamp_secs: u64) -> BasicProperties {
    BasicProperties::default()
        .with_content_type(CONTENT_TYPE_JSON.into())
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
        .with_message_id(message_id.into())
        .with_timestamp(timestamp_secs)
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, message: &RabbitmqMessage<Value>) -> Result<()> {
        let mut guard = self.link.lock().await;

        let stale = guard.as_ref().map_or(true, |link| !link.is_usable());
        if stale {
            if guard.take().is_some() {
                warn!(exchange = %self.config.exchange, "RabbitMQ link lost, reconnecting");
            }
            *guard = Some(Link::open(&self.config).await?);
        }

        let channel = match guard.as_ref() {
            Some(link) => link.channel.clone(),
            None => return Err(AppError::Publish("RabbitMQ link unavailable".to_string())),
        };
        Self::send(&channel, &self.config.exchange, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_are_persistent_json() {
        let props = properties("m-1".to_string(), 1_700_000_000);

        assert_eq!(
            props.content_type().as_ref().map(|s| s.as_str()),
            Some(CONTENT_TYPE_JSON)
        );
        assert_eq!(*props.delivery_mode(), Some(DELIVERY_MODE_PERSISTENT));
        assert_eq!(props.message_id().as_ref().map(|s| s.as_str()), Some("m-1"));
        assert_eq!(*props.timestamp(), Some(1_700_000_000));
    }

    #[test]
    fn test_reconnect_when_either_side_is_down() {
        assert!(!needs_reconnect(true, true));
        assert!(needs_reconnect(false, true));
        assert!(needs_reconnect(true, false));
        assert!(needs_reconnect(false, false));
    }
}
