// Transaction port for atomic multi-step writes
//
// Every state change and the outbox row announcing it are written through
// one `StoreTransaction`, so an event is enqueued if and only if the change
// is committed.

use crate::domain::{Account, AccountId, OutboxEntry, Profile, Task, TaskId};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens write transactions
///
/// Write transactions are serialized: a transaction holds the store's write
/// lock from `begin` until commit or rollback, so reads made through it see
/// the latest committed state and cannot go stale before the write.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;
}

/// Write operations available inside a transaction
#[async_trait]
pub trait StoreTransaction: Transaction {
    /// Insert account; a taken username is reported as `AppError::Conflict`
    async fn insert_account(&mut self, account: &Account) -> Result<()>;

    /// Number of accounts visible inside the transaction
    async fn count_accounts(&mut self) -> Result<i64>;

    async fn insert_profile(&mut self, profile: &Profile) -> Result<()>;

    /// Read a profile under the transaction's write lock
    async fn find_profile(&mut self, user_id: &AccountId) -> Result<Option<Profile>>;

    async fn update_profile(&mut self, profile: &Profile) -> Result<()>;

    /// Returns false when no profile existed
    async fn delete_profile(&mut self, user_id: &AccountId) -> Result<bool>;

    async fn insert_task(&mut self, task: &Task) -> Result<()>;

    /// Read a task under the transaction's write lock
    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>>;

    async fn update_task(&mut self, task: &Task) -> Result<()>;

    /// Returns false when no task existed
    async fn delete_task(&mut self, id: &TaskId) -> Result<bool>;

    async fn enqueue_event(&mut self, entry: &OutboxEntry) -> Result<()>;
}
