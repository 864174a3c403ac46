// Create Task Use Case

use crate::application::events;
use crate::domain::{DomainEvent, Principal, Priority, Task};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider, UnitOfWork};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub due_at: Option<i64>,
}

/// Execute create use case (task row + `task.created` event, atomically)
pub async fn execute(
    uow: &dyn UnitOfWork,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    principal: &Principal,
    req: CreateTaskRequest,
) -> Result<Task> {
    let now = time_provider.now_millis();

    let mut task = Task::new(
        id_provider.generate_id(),
        now,
        principal.account_id.clone(),
        req.title,
    )?;
    task.description = req.description;
    task.priority = req.priority;
    task.due_at = req.due_at;
    task.validate()?;

    let mut tx = uow.begin().await?;
    tx.insert_task(&task).await?;
    events::stage(
        tx.as_mut(),
        id_provider,
        now,
        DomainEvent::TaskCreated { task: task.clone() },
    )
    .await?;
    tx.commit().await?;

    Ok(task)
}
