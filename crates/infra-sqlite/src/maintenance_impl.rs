// SQLite Maintenance Implementation
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use taskhub_core::domain::OutboxState;
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::{Maintenance, MaintenanceStats, TimeProvider};
use tracing::info;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    async fn pragma(&self, name: &str) -> Result<i64> {
        sqlx::query_scalar(&format!("PRAGMA {}", name))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read {}: {}", name, e)))
    }

    async fn count(&self, table: &str) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_outbox(&self, state: OutboxState) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE state = ?")
            .bind(state.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<()> {
        info!("Running VACUUM to optimize database...");

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        info!("VACUUM completed");
        Ok(())
    }

    async fn optimize(&self) -> Result<()> {
        sqlx::query("PRAGMA optimize")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("PRAGMA optimize failed: {}", e)))?;
        Ok(())
    }

    async fn purge_delivered_events(&self, retention_days: i64) -> Result<u64> {
        let retention_ms = retention_days.max(0).saturating_mul(MILLIS_PER_DAY);
        let cutoff_time = self.time_provider.now_millis().saturating_sub(retention_ms);

        info!(
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Purging delivered outbox entries"
        );

        let result = sqlx::query(
            r#"
            DELETE FROM outbox
            WHERE state = ?
            AND delivered_at IS NOT NULL
            AND delivered_at < ?
            "#,
        )
        .bind(OutboxState::Delivered.to_string())
        .bind(cutoff_time)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let purged = result.rows_affected();
        info!(purged_events = purged, "Outbox purge completed");

        Ok(purged)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let page_count = self.pragma("page_count").await?;
        let page_size = self.pragma("page_size").await?;
        let freelist_count = self.pragma("freelist_count").await?;

        let fragmentation_percent = if page_count > 0 {
            (freelist_count as f64 / page_count as f64) * 100.0
        } else {
            0.0
        };

        Ok(MaintenanceStats {
            db_size_bytes: page_count * page_size,
            account_count: self.count("accounts").await?,
            profile_count: self.count("profiles").await?,
            task_count: self.count("tasks").await?,
            outbox_pending: self.count_outbox(OutboxState::Pending).await?,
            outbox_delivered: self.count_outbox(OutboxState::Delivered).await?,
            outbox_failed: self.count_outbox(OutboxState::Failed).await?,
            fragmentation_percent,
        })
    }
}
