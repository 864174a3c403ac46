// Domain Events published by the services

use super::account::{AccountId, Role};
use super::message::RabbitmqMessage;
use super::profile::Profile;
use super::task::{Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    AccountRegistered {
        account_id: AccountId,
        username: String,
        roles: Vec<Role>,
        at: i64,
    },
    ProfileCreated {
        profile: Profile,
    },
    ProfileUpdated {
        profile: Profile,
    },
    ProfileDeleted {
        user_id: AccountId,
        at: i64,
    },
    TaskCreated {
        task: Task,
    },
    TaskUpdated {
        task: Task,
    },
    TaskStatusChanged {
        task_id: TaskId,
        owner_id: AccountId,
        from: TaskStatus,
        to: TaskStatus,
        at: i64,
    },
    TaskDeleted {
        task_id: TaskId,
        owner_id: AccountId,
        at: i64,
    },
}

impl DomainEvent {
    /// Routing key on the topic exchange
    pub fn topic(&self) -> &'static str {
        match self {
            DomainEvent::AccountRegistered { .. } => "account.registered",
            DomainEvent::ProfileCreated { .. } => "profile.created",
            DomainEvent::ProfileUpdated { .. } => "profile.updated",
            DomainEvent::ProfileDeleted { .. } => "profile.deleted",
            DomainEvent::TaskCreated { .. } => "task.created",
            DomainEvent::TaskUpdated { .. } => "task.updated",
            DomainEvent::TaskStatusChanged { .. } => "task.status_changed",
            DomainEvent::TaskDeleted { .. } => "task.deleted",
        }
    }

    pub fn into_message(self) -> RabbitmqMessage<DomainEvent> {
        RabbitmqMessage::new(self.topic(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_matches_envelope() {
        let event = DomainEvent::TaskDeleted {
            task_id: "t-1".into(),
            owner_id: "u-1".into(),
            at: 10,
        };
        let msg = event.clone().into_message();
        assert_eq!(msg.topic(), "task.deleted");
        assert_eq!(msg.payload(), &event);
    }

    #[test]
    fn test_event_is_tagged() {
        let event = DomainEvent::TaskStatusChanged {
            task_id: "t-1".into(),
            owner_id: "u-1".into(),
            from: TaskStatus::Todo,
            to: TaskStatus::InProgress,
            at: 20,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_status_changed");
        assert_eq!(json["from"], "TODO");
        assert_eq!(json["to"], "IN_PROGRESS");
    }

    #[test]
    fn test_topics_are_unique() {
        let profile = Profile::new("u-1", 0, "A", "a@b.c").unwrap();
        let task = Task::new("t-1", 0, "u-1", "x").unwrap();
        let events = vec![
            DomainEvent::AccountRegistered {
                account_id: "u-1".into(),
                username: "alice".into(),
                roles: vec![Role::User],
                at: 0,
            },
            DomainEvent::ProfileCreated {
                profile: profile.clone(),
            },
            DomainEvent::ProfileUpdated { profile },
            DomainEvent::ProfileDeleted {
                user_id: "u-1".into(),
                at: 0,
            },
            DomainEvent::TaskCreated { task: task.clone() },
            DomainEvent::TaskUpdated { task },
            DomainEvent::TaskStatusChanged {
                task_id: "t-1".into(),
                owner_id: "u-1".into(),
                from: TaskStatus::Todo,
                to: TaskStatus::Done,
                at: 0,
            },
            DomainEvent::TaskDeleted {
                task_id: "t-1".into(),
                owner_id: "u-1".into(),
                at: 0,
            },
        ];
        let topics: std::collections::HashSet<_> = events.iter().map(|e| e.topic()).collect();
        assert_eq!(topics.len(), events.len());
    }
}
