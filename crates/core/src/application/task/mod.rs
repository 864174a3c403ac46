// Task Service - Core use cases for task management

pub mod create;

pub use create::CreateTaskRequest;

use crate::application::events;
use crate::domain::{DomainEvent, Principal, Task, TaskAction, TaskId, TaskPatch, TaskStatus};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, StoreTransaction, TaskFilter, TaskRepository, TimeProvider, UnitOfWork,
};
use std::sync::Arc;
use tracing::info;

pub struct TaskService {
    uow: Arc<dyn UnitOfWork>,
    tasks: Arc<dyn TaskRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl TaskService {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        tasks: Arc<dyn TaskRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            uow,
            tasks,
            id_provider,
            time_provider,
        }
    }

    pub async fn create(&self, principal: &Principal, req: CreateTaskRequest) -> Result<Task> {
        let task = create::execute(
            self.uow.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            principal,
            req,
        )
        .await?;

        info!(task_id = %task.id, owner_id = %task.owner_id, "Task created");
        Ok(task)
    }

    pub async fn get(&self, principal: &Principal, id: &TaskId) -> Result<Task> {
        self.load_accessible(principal, id).await
    }

    /// The caller's own tasks
    pub async fn list(&self, principal: &Principal, filter: TaskFilter) -> Result<Vec<Task>> {
        self.tasks.find_by_owner(&principal.account_id, &filter).await
    }

    /// Task count per status for the caller, every status included
    pub async fn summary(&self, principal: &Principal) -> Result<Vec<(TaskStatus, i64)>> {
        let counts = self.tasks.count_by_status(&principal.account_id).await?;
        Ok(TaskStatus::ALL
            .iter()
            .map(|status| {
                let n = counts
                    .iter()
                    .find(|(s, _)| s == status)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (*status, n)
            })
            .collect())
    }

    pub async fn update(&self, principal: &Principal, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return Err(AppError::Validation("Task patch is empty".to_string()));
        }

        let mut tx = self.uow.begin().await?;
        let mut task = locked(tx.as_mut(), principal, id).await?;
        let now = self.time_provider.now_millis();
        task.apply(patch, now)?;

        tx.update_task(&task).await?;
        events::stage(
            tx.as_mut(),
            self.id_provider.as_ref(),
            now,
            DomainEvent::TaskUpdated { task: task.clone() },
        )
        .await?;
        tx.commit().await?;

        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    pub async fn transition(
        &self,
        principal: &Principal,
        id: &TaskId,
        action: TaskAction,
    ) -> Result<Task> {
        let mut tx = self.uow.begin().await?;
        let mut task = locked(tx.as_mut(), principal, id).await?;
        let now = self.time_provider.now_millis();
        let from = task.perform(action, now)?;

        tx.update_task(&task).await?;
        events::stage(
            tx.as_mut(),
            self.id_provider.as_ref(),
            now,
            DomainEvent::TaskStatusChanged {
                task_id: task.id.clone(),
                owner_id: task.owner_id.clone(),
                from,
                to: task.status,
                at: now,
            },
        )
        .await?;
        tx.commit().await?;

        info!(task_id = %task.id, from = %from, to = %task.status, "Task status changed");
        Ok(task)
    }

    pub async fn delete(&self, principal: &Principal, id: &TaskId) -> Result<()> {
        let mut tx = self.uow.begin().await?;
        let task = locked(tx.as_mut(), principal, id).await?;
        let now = self.time_provider.now_millis();

        if !tx.delete_task(&task.id).await? {
            return Err(AppError::not_found("Task", id));
        }
        events::stage(
            tx.as_mut(),
            self.id_provider.as_ref(),
            now,
            DomainEvent::TaskDeleted {
                task_id: task.id.clone(),
                owner_id: task.owner_id.clone(),
                at: now,
            },
        )
        .await?;
        tx.commit().await?;

        info!(task_id = %task.id, "Task deleted");
        Ok(())
    }

    /// Other users' tasks are reported as missing, not forbidden
    async fn load_accessible(&self, principal: &Principal, id: &TaskId) -> Result<Task> {
        accessible(self.tasks.find_by_id(id).await?, principal, id)
    }
}

/// Current row, read under the write lock so the change applies to it
async fn locked(
    tx: &mut dyn StoreTransaction,
    principal: &Principal,
    id: &TaskId,
) -> Result<Task> {
    accessible(tx.find_task(id).await?, principal, id)
}

fn accessible(task: Option<Task>, principal: &Principal, id: &TaskId) -> Result<Task> {
    match task {
        Some(task) if principal.can_access(&task.owner_id) => Ok(task),
        _ => Err(AppError::not_found("Task", id)),
    }
}
