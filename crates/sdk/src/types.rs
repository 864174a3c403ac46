//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types of the gateway.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub account_id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub token_type: String,
    /// Epoch seconds
    pub expires_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub account_id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// `None` fields are left untouched; an empty `bio` clears it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileList {
    pub profiles: Vec<Profile>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// TODO, IN_PROGRESS, DONE or ARCHIVED
    pub status: String,
    pub priority: i32,
    pub due_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<i64>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// `due_at: Some(None)` clears the due date
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResult {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    pub accounts: i64,
    pub profiles: i64,
    pub tasks: i64,
    pub outbox_pending: i64,
    pub outbox_delivered: i64,
    pub outbox_failed: i64,
    pub db_size_bytes: i64,
    pub fragmentation_percent: f64,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceResult {
    pub purged_events: u64,
    pub vacuum_run: bool,
    pub db_size_before: i64,
    pub db_size_after: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_update_serializes_only_set_fields() {
        let update = TaskUpdate {
            title: Some("Renamed".into()),
            ..TaskUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"title": "Renamed"}));

        let clear = TaskUpdate {
            due_at: Some(None),
            ..TaskUpdate::default()
        };
        assert_eq!(serde_json::to_value(&clear).unwrap(), json!({"due_at": null}));
    }

    #[test]
    fn test_new_task_defaults() {
        let task = NewTask::titled("Ship");
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({"title": "Ship", "description": "", "priority": 0})
        );
    }
}
