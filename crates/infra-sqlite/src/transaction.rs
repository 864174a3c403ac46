// SQLite Transaction Implementation (UnitOfWork / StoreTransaction)

use crate::error::map_sqlx_error;
use crate::rows::{encode_roles, ProfileRow, TaskRow};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction as SqlxTransaction};
use taskhub_core::domain::{Account, AccountId, OutboxEntry, Profile, Task, TaskId};
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::{StoreTransaction, Transaction, UnitOfWork};

/// Opens `SqliteStoreTransaction`s on a pool
pub struct SqliteUnitOfWork {
    pool: SqlitePool,
}

impl SqliteUnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Take the write lock up front; a deferred transaction that reads before
/// writing fails with SQLITE_BUSY when another writer commits in between
const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE";

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin_with(BEGIN_IMMEDIATE)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteStoreTransaction::new(tx)))
    }
}

/// Dropping without commit rolls back
pub struct SqliteStoreTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteStoreTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteStoreTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl StoreTransaction for SqliteStoreTransaction {
    async fn insert_account(&mut self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, roles, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(encode_roles(&account.roles))
        .bind(account.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Username {} is already taken",
                account.username
            )),
            other => other,
        })?;

        Ok(())
    }

    async fn count_accounts(&mut self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, email, bio, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_profile(&mut self, user_id: &AccountId) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn update_profile(&mut self, profile: &Profile) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET display_name = ?, email = ?, bio = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(profile.updated_at)
        .bind(&profile.user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Profile", &profile.user_id));
        }
        Ok(())
    }

    async fn delete_profile(&mut self, user_id: &AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&mut self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, owner_id, title, description, status, priority,
                due_at, created_at, updated_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.to_string())
        .bind(task.priority)
        .bind(task.due_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_task(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn update_task(&mut self, task: &Task) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, status = ?, priority = ?,
                due_at = ?, updated_at = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.to_string())
        .bind(task.priority)
        .bind(task.due_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .bind(&task.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Task", &task.id));
        }
        Ok(())
    }

    async fn delete_task(&mut self, id: &TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn enqueue_event(&mut self, entry: &OutboxEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox (
                id, topic, payload, state, attempts, max_attempts,
                next_attempt_at, created_at, delivered_at, failed_at, last_error
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.topic)
        .bind(entry.payload.to_string())
        .bind(entry.state.to_string())
        .bind(entry.attempts)
        .bind(entry.max_attempts)
        .bind(entry.next_attempt_at)
        .bind(entry.created_at)
        .bind(entry.delivered_at)
        .bind(entry.failed_at)
        .bind(&entry.last_error)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
