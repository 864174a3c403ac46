// SQLite TaskRepository Implementation

use crate::error::{corrupt, map_sqlx_error};
use crate::rows::TaskRow;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskhub_core::domain::{AccountId, Task, TaskId, TaskStatus};
use taskhub_core::error::Result;
use taskhub_core::port::{TaskFilter, TaskRepository};

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn find_by_owner(&self, owner_id: &AccountId, filter: &TaskFilter) -> Result<Vec<Task>> {
        let (limit, offset) = filter.page();
        let status = filter.status.map(|s| s.to_string());

        // NULL status binds to "no filter"
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            SELECT * FROM tasks
            WHERE owner_id = ?
              AND (? IS NULL OR status = ?)
            ORDER BY priority DESC, created_at ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(&status)
        .bind(&status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn count_by_status(&self, owner_id: &AccountId) -> Result<Vec<(TaskStatus, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tasks WHERE owner_id = ? GROUP BY status",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = status
                    .parse::<TaskStatus>()
                    .map_err(|e| corrupt("tasks.status", e))?;
                Ok((status, count))
            })
            .collect()
    }
}
