// Message Envelopes
//
// `Message<T>` carries a payload; `RabbitmqMessage<T>` adds the topic used
// as routing key on the broker. Both are write-once: fields are private and
// only set by the constructors.

use serde::{Deserialize, Serialize};

/// Generic message envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message<T> {
    payload: T,
}

impl<T> Message<T> {
    pub fn new(payload: T) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Message envelope bound for a RabbitMQ topic exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RabbitmqMessage<T> {
    topic: String,
    #[serde(flatten)]
    message: Message<T>,
}

impl<T> RabbitmqMessage<T> {
    pub fn new(topic: impl Into<String>, payload: T) -> Self {
        Self {
            topic: topic.into(),
            message: Message::new(payload),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &T {
        self.message.payload()
    }

    /// The underlying topic-less envelope
    pub fn message(&self) -> &Message<T> {
        &self.message
    }

    pub fn into_parts(self) -> (String, T) {
        (self.topic, self.message.into_payload())
    }

    /// Same topic, transformed payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RabbitmqMessage<U> {
        let (topic, payload) = self.into_parts();
        RabbitmqMessage::new(topic, f(payload))
    }
}

impl<T: Serialize> RabbitmqMessage<T> {
    /// Erase the payload type into JSON (outbox storage format)
    pub fn to_json(&self) -> serde_json::Result<RabbitmqMessage<serde_json::Value>> {
        Ok(RabbitmqMessage::new(
            self.topic.clone(),
            serde_json::to_value(self.payload())?,
        ))
    }
}

impl<T> From<RabbitmqMessage<T>> for Message<T> {
    fn from(msg: RabbitmqMessage<T>) -> Self {
        msg.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ping {
        seq: u32,
    }

    #[test]
    fn test_message_preserves_payload() {
        let msg = Message::new(vec![1, 2, 3]);
        assert_eq!(msg.payload(), &vec![1, 2, 3]);
        assert_eq!(msg.into_payload(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rabbitmq_message_preserves_topic_and_payload() {
        let cases = [
            ("task.created", Ping { seq: 0 }),
            ("", Ping { seq: u32::MAX }),
            ("profile.updated.ünïcode", Ping { seq: 7 }),
        ];

        for (topic, payload) in cases {
            let msg = RabbitmqMessage::new(topic, payload.clone());
            assert_eq!(msg.topic(), topic);
            assert_eq!(msg.payload(), &payload);
            assert_eq!(msg.message().payload(), &payload);

            let (t, p) = msg.into_parts();
            assert_eq!(t, topic);
            assert_eq!(p, payload);
        }
    }

    #[test]
    fn test_rabbitmq_message_with_unit_and_string_payloads() {
        let unit = RabbitmqMessage::new("heartbeat", ());
        assert_eq!(unit.topic(), "heartbeat");

        let text = RabbitmqMessage::new(String::from("log"), String::from("hello"));
        assert_eq!(text.payload(), "hello");
    }

    #[test]
    fn test_map_keeps_topic() {
        let msg = RabbitmqMessage::new("task.updated", 21).map(|n| n * 2);
        assert_eq!(msg.topic(), "task.updated");
        assert_eq!(*msg.payload(), 42);
    }

    #[test]
    fn test_json_shape() {
        let msg = RabbitmqMessage::new("task.deleted", Ping { seq: 3 });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"topic": "task.deleted", "payload": {"seq": 3}}));

        let back: RabbitmqMessage<Ping> = serde_json::from_value(value).unwrap();
        assert_eq!(back.payload(), &Ping { seq: 3 });

        let erased = msg.to_json().unwrap();
        assert_eq!(erased.payload(), &json!({"seq": 3}));
        assert_eq!(erased.topic(), "task.deleted");
    }

    #[test]
    fn test_into_plain_message_drops_topic() {
        let plain: Message<&str> = RabbitmqMessage::new("t", "body").into();
        assert_eq!(*plain.payload(), "body");
    }
}
