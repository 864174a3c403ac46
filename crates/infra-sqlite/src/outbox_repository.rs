// SQLite OutboxRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::OutboxRow;
use async_trait::async_trait;
use sqlx::SqlitePool;
use taskhub_core::domain::{OutboxEntry, OutboxState};
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::OutboxRepository;

pub struct SqliteOutboxRepository {
    pool: SqlitePool,
}

impl SqliteOutboxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxRepository for SqliteOutboxRepository {
    async fn find_due(&self, now_millis: i64, limit: i64) -> Result<Vec<OutboxEntry>> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT * FROM outbox
            WHERE state = ? AND next_attempt_at <= ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(OutboxState::Pending.to_string())
        .bind(now_millis)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(OutboxRow::into_entry).collect()
    }

    async fn update(&self, entry: &OutboxEntry) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE outbox
            SET state = ?, attempts = ?, next_attempt_at = ?,
                delivered_at = ?, failed_at = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.state.to_string())
        .bind(entry.attempts)
        .bind(entry.next_attempt_at)
        .bind(entry.delivered_at)
        .bind(entry.failed_at)
        .bind(&entry.last_error)
        .bind(&entry.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            // Purged by maintenance while in flight
            return Err(AppError::not_found("Outbox entry", &entry.id));
        }
        Ok(())
    }

    async fn count_by_state(&self, state: OutboxState) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE state = ?")
            .bind(state.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
