// Taskhub Infrastructure - AMQP Adapter
// Implements: EventPublisher (RabbitMQ topic exchange, tracing fallback)

mod config;
mod publisher;
mod tracing_publisher;

pub use config::AmqpConfig;
pub use publisher::AmqpPublisher;
pub use tracing_publisher::TracingPublisher;
