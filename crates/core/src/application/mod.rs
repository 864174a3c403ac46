// Application Layer - Use Cases and Business Logic

pub mod auth;
pub mod events;
pub mod maintenance;
pub mod profile;
pub mod relay;
pub mod retry;
pub mod security;
pub mod task;

// Re-exports
pub use auth::AuthService;
pub use maintenance::MaintenanceScheduler;
pub use profile::ProfileService;
pub use relay::{shutdown_channel, OutboxRelay, RelayConfig, ShutdownSender, ShutdownToken};
pub use security::{authorize, Operation};
pub use task::TaskService;
