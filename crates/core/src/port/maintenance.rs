// DB Maintenance port
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Database maintenance statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceStats {
    pub db_size_bytes: i64,
    pub account_count: i64,
    pub profile_count: i64,
    pub task_count: i64,
    pub outbox_pending: i64,
    pub outbox_delivered: i64,
    pub outbox_failed: i64,
    pub fragmentation_percent: f64,
}

impl MaintenanceStats {
    pub fn db_size_mb(&self) -> f64 {
        self.db_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Maintenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Retention period for delivered outbox entries (days)
    pub delivered_retention_days: i64,

    /// Free-page ratio above which VACUUM runs (percent)
    pub vacuum_fragmentation_percent: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            delivered_retention_days: 7,
            vacuum_fragmentation_percent: 10.0,
        }
    }
}

/// Summary of one maintenance run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub purged_events: u64,
    pub vacuum_run: bool,
    pub db_size_before: i64,
    pub db_size_after: i64,
}

/// Database maintenance operations
#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Run VACUUM to reclaim space
    async fn vacuum(&self) -> Result<()>;

    /// Refresh query planner statistics
    async fn optimize(&self) -> Result<()>;

    /// Delete delivered outbox entries older than the retention period
    ///
    /// # Returns
    /// Number of entries deleted
    async fn purge_delivered_events(&self, retention_days: i64) -> Result<u64>;

    /// Get maintenance statistics
    async fn get_stats(&self) -> Result<MaintenanceStats>;

    /// Purge, optimize, and VACUUM when fragmented (or when forced)
    async fn run_full_maintenance(
        &self,
        config: &MaintenanceConfig,
        force_vacuum: bool,
    ) -> Result<MaintenanceReport> {
        let before = self.get_stats().await?;

        let purged_events = self
            .purge_delivered_events(config.delivered_retention_days)
            .await?;

        self.optimize().await?;

        let vacuum_run =
            force_vacuum || before.fragmentation_percent > config.vacuum_fragmentation_percent;
        if vacuum_run {
            self.vacuum().await?;
        }

        let after = self.get_stats().await?;

        tracing::info!(
            purged_events = purged_events,
            vacuum_run = vacuum_run,
            db_size_mb = after.db_size_mb(),
            "Maintenance completed"
        );

        Ok(MaintenanceReport {
            purged_events,
            vacuum_run,
            db_size_before: before.db_size_bytes,
            db_size_after: after.db_size_bytes,
        })
    }
}
