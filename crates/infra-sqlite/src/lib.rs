// Taskhub Infrastructure - SQLite Adapter
// Implements: repositories, UnitOfWork/StoreTransaction, Maintenance

mod account_repository;
mod connection;
mod error;
mod maintenance_impl;
mod migration;
mod outbox_repository;
mod profile_repository;
mod rows;
mod task_repository;
mod transaction;

pub use account_repository::SqliteAccountRepository;
pub use connection::create_pool;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use outbox_repository::SqliteOutboxRepository;
pub use profile_repository::SqliteProfileRepository;
pub use task_repository::SqliteTaskRepository;
pub use transaction::{SqliteStoreTransaction, SqliteUnitOfWork};

// Note: sqlx::Error conversion goes through error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
