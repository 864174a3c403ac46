// Task Domain Model

use super::account::AccountId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Task ID (UUID v4)
pub type TaskId = String;

/// Priority (higher number = more urgent)
pub type Priority = i32;

pub const MIN_PRIORITY: Priority = 0;
pub const MAX_PRIORITY: Priority = 10;

const TITLE_MAX_LEN: usize = 200;
const DESCRIPTION_MAX_LEN: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Archived,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Archived,
    ];
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "TODO"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Done => write!(f, "DONE"),
            TaskStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "ARCHIVED" => Ok(TaskStatus::Archived),
            other => Err(DomainError::Validation(format!(
                "Unknown task status: {}",
                other
            ))),
        }
    }
}

/// Status change requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Start,
    Complete,
    Reopen,
    Archive,
}

/// Task Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: AccountId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_at: Option<i64>, // epoch ms

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Partial update; `None` leaves the field untouched.
/// `due_at: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub due_at: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_at.is_none()
    }
}

impl Task {
    /// Create a new Task
    ///
    /// # Arguments
    ///
    /// * `id` - Unique task ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `owner_id` - Owning account
    /// * `title` - Short title, trimmed
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        owner_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self> {
        let task = Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title: title.into().trim().to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: MIN_PRIORITY,
            due_at: None,
            created_at,
            updated_at: created_at,
            completed_at: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<()> {
        let title_len = self.title.chars().count();
        if title_len == 0 {
            return Err(DomainError::Validation("Task title cannot be empty".into()));
        }
        if title_len > TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Task title too long (max {} characters)",
                TITLE_MAX_LEN
            )));
        }
        if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Task description too long (max {} characters)",
                DESCRIPTION_MAX_LEN
            )));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(DomainError::Validation(format!(
                "Priority {} out of range ({}-{})",
                self.priority, MIN_PRIORITY, MAX_PRIORITY
            )));
        }
        Ok(())
    }

    /// Apply a patch, validating the result before committing it
    pub fn apply(&mut self, patch: TaskPatch, now_millis: i64) -> Result<()> {
        if self.status == TaskStatus::Archived {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: "EDITED".to_string(),
            });
        }

        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(due_at) = patch.due_at {
            next.due_at = due_at;
        }
        next.validate()?;
        next.updated_at = now_millis;
        *self = next;
        Ok(())
    }

    /// Apply a status action, returning the previous status
    pub fn perform(&mut self, action: TaskAction, now_millis: i64) -> Result<TaskStatus> {
        let from = self.status;
        match action {
            TaskAction::Start => self.start(now_millis)?,
            TaskAction::Complete => self.complete(now_millis)?,
            TaskAction::Reopen => self.reopen(now_millis)?,
            TaskAction::Archive => self.archive(now_millis)?,
        }
        Ok(from)
    }

    /// Todo -> InProgress
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        self.transition(&[TaskStatus::Todo], TaskStatus::InProgress, now_millis)
    }

    /// Todo | InProgress -> Done
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.transition(
            &[TaskStatus::Todo, TaskStatus::InProgress],
            TaskStatus::Done,
            now_millis,
        )?;
        self.completed_at = Some(now_millis);
        Ok(())
    }

    /// Done -> Todo
    pub fn reopen(&mut self, now_millis: i64) -> Result<()> {
        self.transition(&[TaskStatus::Done], TaskStatus::Todo, now_millis)?;
        self.completed_at = None;
        Ok(())
    }

    /// Anything but Archived -> Archived
    pub fn archive(&mut self, now_millis: i64) -> Result<()> {
        self.transition(
            &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done],
            TaskStatus::Archived,
            now_millis,
        )
    }

    fn transition(&mut self, allowed: &[TaskStatus], to: TaskStatus, now_millis: i64) -> Result<()> {
        if !allowed.contains(&self.status) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = now_millis;
        Ok(())
    }
}

/// Distinguishes "field absent" from "field set to null"
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new("t-1", 1000, "u-1", "Write docs").unwrap()
    }

    #[test]
    fn test_new_task_defaults() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.priority, 0);
        assert_eq!(t.created_at, 1000);
        assert_eq!(t.updated_at, 1000);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_title_validation() {
        assert!(Task::new("t", 0, "u", "   ").is_err());
        assert!(Task::new("t", 0, "u", "x".repeat(201)).is_err());
        assert!(Task::new("t", 0, "u", "x".repeat(200)).is_ok());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut t = task();
        assert_eq!(t.perform(TaskAction::Start, 2000).unwrap(), TaskStatus::Todo);
        assert_eq!(t.status, TaskStatus::InProgress);

        assert_eq!(
            t.perform(TaskAction::Complete, 3000).unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.completed_at, Some(3000));

        t.perform(TaskAction::Reopen, 4000).unwrap();
        assert_eq!(t.status, TaskStatus::Todo);
        assert!(t.completed_at.is_none());
        assert_eq!(t.updated_at, 4000);
    }

    #[test]
    fn test_complete_directly_from_todo() {
        let mut t = task();
        t.complete(1500).unwrap();
        assert_eq!(t.status, TaskStatus::Done);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut t = task();
        let err = t.reopen(2000).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.updated_at, 1000);

        t.archive(2000).unwrap();
        assert!(t.start(3000).is_err());
        assert!(t.archive(3000).is_err());
        assert!(t.complete(3000).is_err());
    }

    #[test]
    fn test_archived_task_cannot_be_edited() {
        let mut t = task();
        t.archive(2000).unwrap();
        let result = t.apply(
            TaskPatch {
                title: Some("Renamed".into()),
                ..Default::default()
            },
            3000,
        );
        assert!(result.is_err());
        assert_eq!(t.title, "Write docs");
    }

    #[test]
    fn test_patch_priority_range() {
        let mut t = task();
        assert!(t
            .apply(
                TaskPatch {
                    priority: Some(11),
                    ..Default::default()
                },
                2000
            )
            .is_err());
        assert_eq!(t.priority, 0);

        t.apply(
            TaskPatch {
                priority: Some(10),
                ..Default::default()
            },
            2000,
        )
        .unwrap();
        assert_eq!(t.priority, 10);
    }

    #[test]
    fn test_patch_due_at_set_and_clear() {
        let mut t = task();
        let set: TaskPatch = serde_json::from_value(serde_json::json!({"due_at": 9000})).unwrap();
        t.apply(set, 2000).unwrap();
        assert_eq!(t.due_at, Some(9000));

        let untouched: TaskPatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(untouched.is_empty());
        t.apply(untouched, 2500).unwrap();
        assert_eq!(t.due_at, Some(9000));

        let clear: TaskPatch = serde_json::from_value(serde_json::json!({"due_at": null})).unwrap();
        t.apply(clear, 3000).unwrap();
        assert_eq!(t.due_at, None);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
        }
    }
}
