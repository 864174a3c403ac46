// SQLite row representations and their domain conversions

use crate::error::corrupt;
use taskhub_core::domain::{Account, OutboxEntry, OutboxState, Profile, Role, Task, TaskStatus};
use taskhub_core::error::Result;

/// Roles are stored as a comma-separated list ("USER,ADMIN")
pub(crate) fn encode_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_roles(raw: &str) -> Result<Vec<Role>> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Role>().map_err(|e| corrupt("accounts.roles", e)))
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AccountRow {
    id: String,
    username: String,
    password_hash: String,
    roles: String,
    created_at: i64,
}

impl AccountRow {
    pub(crate) fn into_account(self) -> Result<Account> {
        Ok(Account {
            roles: decode_roles(&self.roles)?,
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProfileRow {
    user_id: String,
    display_name: String,
    email: String,
    bio: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ProfileRow {
    pub(crate) fn into_profile(self) -> Profile {
        Profile {
            user_id: self.user_id,
            display_name: self.display_name,
            email: self.email,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TaskRow {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    status: String,
    priority: i32,
    due_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
    completed_at: Option<i64>,
}

impl TaskRow {
    pub(crate) fn into_task(self) -> Result<Task> {
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|e| corrupt("tasks.status", e))?;

        Ok(Task {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            status,
            priority: self.priority,
            due_at: self.due_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OutboxRow {
    id: String,
    topic: String,
    payload: String,
    state: String,
    attempts: i32,
    max_attempts: i32,
    next_attempt_at: i64,
    created_at: i64,
    delivered_at: Option<i64>,
    failed_at: Option<i64>,
    last_error: Option<String>,
}

impl OutboxRow {
    pub(crate) fn into_entry(self) -> Result<OutboxEntry> {
        let state = self
            .state
            .parse::<OutboxState>()
            .map_err(|e| corrupt("outbox.state", e))?;
        let payload: serde_json::Value =
            serde_json::from_str(&self.payload).map_err(|e| corrupt("outbox.payload", e))?;

        Ok(OutboxEntry {
            id: self.id,
            topic: self.topic,
            payload,
            state,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            next_attempt_at: self.next_attempt_at,
            created_at: self.created_at,
            delivered_at: self.delivered_at,
            failed_at: self.failed_at,
            last_error: self.last_error,
        })
    }
}
