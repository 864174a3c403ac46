// Port Layer - Interfaces for external dependencies

pub mod event_publisher;
pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod repository;
pub mod security;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use event_publisher::EventPublisher;
pub use id_provider::IdProvider;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceReport, MaintenanceStats};
pub use repository::{
    AccountRepository, OutboxRepository, ProfileRepository, TaskFilter, TaskRepository,
};
pub use security::{AccessToken, PasswordHasher, TokenService};
pub use time_provider::TimeProvider;
pub use transaction::{StoreTransaction, Transaction, UnitOfWork};
