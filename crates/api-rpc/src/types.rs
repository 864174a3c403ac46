//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};
use taskhub_core::domain::{
    AccountId, Profile, ProfilePatch, Role, Task, TaskAction, TaskId, TaskPatch,
    TaskStatus,
};

/// Parameters of a protected method: the bearer token next to the method's own fields
#[derive(Debug, Deserialize)]
pub struct Authenticated<T> {
    pub access_token: String,
    #[serde(flatten)]
    pub body: T,
}

/// Methods without parameters of their own
#[derive(Debug, Default, Deserialize)]
pub struct NoParams {}

/// system.health.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

/// auth.register.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account_id: AccountId,
    pub username: String,
    pub roles: Vec<Role>,
    pub profile: Profile,
}

/// auth.login.v1
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// auth.whoami.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub account_id: AccountId,
    pub username: String,
    pub roles: Vec<Role>,
    pub created_at: i64,
}

/// profile.get.v1 / profile.delete.v1
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub user_id: AccountId,
}

/// profile.update.v1
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub user_id: AccountId,
    #[serde(flatten)]
    pub patch: ProfilePatch,
}

/// profile.list.v1
#[derive(Debug, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<Profile>,
    pub count: usize,
}

/// task.get.v1 / task.delete.v1
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task_id: TaskId,
}

/// task.list.v1 (params are a `TaskFilter`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

/// task.update.v1
#[derive(Debug, Deserialize)]
pub struct TaskUpdateRequest {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub patch: TaskPatch,
}

/// task.transition.v1
#[derive(Debug, Deserialize)]
pub struct TaskTransitionRequest {
    pub task_id: TaskId,
    pub action: TaskAction,
}

/// task.summary.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummaryResponse {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
}

/// profile.delete.v1 / task.delete.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
}

/// admin.stats.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
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

/// admin.maintenance.v1
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceRequest {
    #[serde(default)]
    pub force_vacuum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub purged_events: u64,
    pub vacuum_run: bool,
    pub db_size_before: i64,
    pub db_size_after: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskhub_core::port::TaskFilter;

    #[test]
    fn test_authenticated_flattens_body() {
        let req: Authenticated<TaskTransitionRequest> = serde_json::from_value(json!({
            "access_token": "tok",
            "task_id": "t-1",
            "action": "complete"
        }))
        .unwrap();

        assert_eq!(req.access_token, "tok");
        assert_eq!(req.body.task_id, "t-1");
        assert_eq!(req.body.action, TaskAction::Complete);
    }

    #[test]
    fn test_authenticated_without_fields() {
        let req: Authenticated<NoParams> =
            serde_json::from_value(json!({"access_token": "tok"})).unwrap();
        assert_eq!(req.access_token, "tok");
    }

    #[test]
    fn test_missing_token_rejected() {
        let res: Result<Authenticated<TaskRequest>, _> =
            serde_json::from_value(json!({"task_id": "t-1"}));
        assert!(res.is_err());
    }

    #[test]
    fn test_task_update_null_due_date_clears() {
        let req: Authenticated<TaskUpdateRequest> = serde_json::from_value(json!({
            "access_token": "tok",
            "task_id": "t-1",
            "due_at": null
        }))
        .unwrap();
        assert_eq!(req.body.patch.due_at, Some(None));
        assert!(req.body.patch.title.is_none());

        let req: Authenticated<TaskUpdateRequest> = serde_json::from_value(json!({
            "access_token": "tok",
            "task_id": "t-1",
            "title": "Renamed"
        }))
        .unwrap();
        assert_eq!(req.body.patch.due_at, None);
        assert_eq!(req.body.patch.title.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_task_list_filters_optional() {
        let req: Authenticated<TaskFilter> = serde_json::from_value(json!({
            "access_token": "tok",
            "status": "IN_PROGRESS"
        }))
        .unwrap();
        assert_eq!(req.body.status, Some(TaskStatus::InProgress));
        assert!(req.body.limit.is_none());
    }
}
