// Domain Layer - Pure business logic and entities

pub mod account;
pub mod error;
pub mod event;
pub mod message;
pub mod outbox;
pub mod profile;
pub mod task;

// Re-exports
pub use account::{Account, AccountId, Principal, Role};
pub use error::{DomainError, ElementNotFound};
pub use event::DomainEvent;
pub use message::{Message, RabbitmqMessage};
pub use outbox::{OutboxEntry, OutboxId, OutboxState};
pub use profile::{Profile, ProfilePatch};
pub use task::{Priority, Task, TaskAction, TaskId, TaskPatch, TaskStatus};
