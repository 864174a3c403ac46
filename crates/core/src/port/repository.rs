// Repository Ports (read side)
//
// Single lookups return `Option`; list queries always return a `Vec`
// (possibly empty), never an optional collection.

use crate::domain::{
    Account, AccountId, OutboxEntry, OutboxState, Profile, Task, TaskId, TaskStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default page size for task listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard upper bound for a single page
pub const MAX_PAGE_SIZE: i64 = 200;

/// Task listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TaskFilter {
    /// Effective (limit, offset) after defaults and clamping
    pub fn page(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: &AccountId) -> Result<Option<Profile>>;

    /// Profiles ordered by creation time
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Profile>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Tasks of one owner, ordered by priority DESC, created_at ASC, id ASC
    async fn find_by_owner(&self, owner_id: &AccountId, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Count of the owner's tasks per status (statuses with zero tasks omitted)
    async fn count_by_status(&self, owner_id: &AccountId) -> Result<Vec<(TaskStatus, i64)>>;
}

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Pending entries whose next attempt is due, oldest first
    async fn find_due(&self, now_millis: i64, limit: i64) -> Result<Vec<OutboxEntry>>;

    /// Persist delivery bookkeeping (state, attempts, schedule, error)
    async fn update(&self, entry: &OutboxEntry) -> Result<()>;

    async fn count_by_state(&self, state: OutboxState) -> Result<i64>;
}
