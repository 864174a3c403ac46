// Outbox Entry - a domain event waiting for broker delivery

use super::message::RabbitmqMessage;
use serde::{Deserialize, Serialize};

pub type OutboxId = String;

/// Default delivery attempts before an entry is parked as FAILED
pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxState {
    Pending,
    Delivered,
    Failed,
}

impl std::fmt::Display for OutboxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboxState::Pending => write!(f, "PENDING"),
            OutboxState::Delivered => write!(f, "DELIVERED"),
            OutboxState::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for OutboxState {
    type Err = super::DomainError;

    fn from_str(s: &str) -> super::error::Result<Self> {
        match s {
            "PENDING" => Ok(OutboxState::Pending),
            "DELIVERED" => Ok(OutboxState::Delivered),
            "FAILED" => Ok(OutboxState::Failed),
            other => Err(super::DomainError::Validation(format!(
                "Unknown outbox state: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: OutboxId,
    pub topic: String,
    pub payload: serde_json::Value,
    pub state: OutboxState,

    pub attempts: i32,
    pub max_attempts: i32,
    pub next_attempt_at: i64, // epoch ms

    pub created_at: i64,
    pub delivered_at: Option<i64>,
    pub failed_at: Option<i64>,
    pub last_error: Option<String>,
}

impl OutboxEntry {
    pub fn from_message(
        id: impl Into<String>,
        now_millis: i64,
        message: RabbitmqMessage<serde_json::Value>,
    ) -> Self {
        let (topic, payload) = message.into_parts();
        Self {
            id: id.into(),
            topic,
            payload,
            state: OutboxState::Pending,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            next_attempt_at: now_millis,
            created_at: now_millis,
            delivered_at: None,
            failed_at: None,
            last_error: None,
        }
    }

    pub fn to_message(&self) -> RabbitmqMessage<serde_json::Value> {
        RabbitmqMessage::new(self.topic.clone(), self.payload.clone())
    }

    pub fn is_due(&self, now_millis: i64) -> bool {
        self.state == OutboxState::Pending && self.next_attempt_at <= now_millis
    }

    pub fn mark_delivered(&mut self, now_millis: i64) {
        self.attempts += 1;
        self.state = OutboxState::Delivered;
        self.delivered_at = Some(now_millis);
        self.last_error = None;
    }

    /// Keep the entry pending and push its next attempt into the future
    pub fn record_failure(&mut self, error: impl Into<String>, next_attempt_at: i64) {
        self.attempts += 1;
        self.next_attempt_at = next_attempt_at;
        self.last_error = Some(error.into());
    }

    /// Give up on the entry
    pub fn mark_failed(&mut self, error: impl Into<String>, now_millis: i64) {
        self.attempts += 1;
        self.state = OutboxState::Failed;
        self.failed_at = Some(now_millis);
        self.last_error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> OutboxEntry {
        OutboxEntry::from_message("o-1", 1000, RabbitmqMessage::new("task.created", json!({"a": 1})))
    }

    #[test]
    fn test_from_message_is_due_immediately() {
        let e = entry();
        assert_eq!(e.state, OutboxState::Pending);
        assert!(e.is_due(1000));
        assert!(!e.is_due(999));

        let msg = e.to_message();
        assert_eq!(msg.topic(), "task.created");
        assert_eq!(msg.payload(), &json!({"a": 1}));
    }

    #[test]
    fn test_failure_then_delivery() {
        let mut e = entry();
        e.record_failure("broker down", 5000);
        assert_eq!(e.attempts, 1);
        assert_eq!(e.state, OutboxState::Pending);
        assert!(!e.is_due(4000));
        assert!(e.is_due(5000));

        e.mark_delivered(6000);
        assert_eq!(e.attempts, 2);
        assert_eq!(e.state, OutboxState::Delivered);
        assert_eq!(e.delivered_at, Some(6000));
        assert!(e.last_error.is_none());
        assert!(!e.is_due(10_000));
    }

    #[test]
    fn test_mark_failed_is_terminal() {
        let mut e = entry();
        e.mark_failed("nack", 7000);
        assert_eq!(e.state, OutboxState::Failed);
        assert_eq!(e.failed_at, Some(7000));
        assert_eq!(e.last_error.as_deref(), Some("nack"));
        assert!(!e.is_due(i64::MAX));
    }
}
