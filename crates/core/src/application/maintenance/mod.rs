// Maintenance Service
// Scheduled outbox cleanup and database upkeep

use crate::application::relay::ShutdownToken;
use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs periodic maintenance operations (outbox purge, optimize, VACUUM)
/// in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    interval: Duration,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours, at least 1)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            interval: Duration::from_secs(interval_hours.max(1) * 3600),
        }
    }

    /// Run maintenance loop until shutdown
    ///
    /// The first tick fires immediately, so a freshly started daemon
    /// cleans up right away.
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.config.delivered_retention_days,
            "Maintenance scheduler started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {},
                _ = shutdown.wait() => break,
            }

            match self.maintenance.run_full_maintenance(&self.config, false).await {
                Ok(report) => {
                    info!(
                        purged_events = report.purged_events,
                        vacuum_run = report.vacuum_run,
                        db_size_after = report.db_size_after,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }

        info!("Maintenance scheduler stopped");
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self, force_vacuum: bool) -> Result<MaintenanceReport> {
        info!(force_vacuum = force_vacuum, "Running manual maintenance...");
        self.maintenance
            .run_full_maintenance(&self.config, force_vacuum)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MaintenanceStats;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    struct FakeMaintenance {
        fragmentation: f64,
        vacuumed: AtomicBool,
        purge_calls: AtomicU64,
    }

    impl FakeMaintenance {
        fn new(fragmentation: f64) -> Self {
            Self {
                fragmentation,
                vacuumed: AtomicBool::new(false),
                purge_calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl Maintenance for FakeMaintenance {
        async fn vacuum(&self) -> Result<()> {
            self.vacuumed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn optimize(&self) -> Result<()> {
            Ok(())
        }

        async fn purge_delivered_events(&self, _retention_days: i64) -> Result<u64> {
            self.purge_calls.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }

        async fn get_stats(&self) -> Result<MaintenanceStats> {
            Ok(MaintenanceStats {
                db_size_bytes: 4096,
                fragmentation_percent: self.fragmentation,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_vacuum_only_when_fragmented() {
        let calm = Arc::new(FakeMaintenance::new(2.0));
        let scheduler = MaintenanceScheduler::new(calm.clone(), MaintenanceConfig::default(), 24);
        let report = scheduler.run_now(false).await.unwrap();
        assert_eq!(report.purged_events, 3);
        assert!(!report.vacuum_run);
        assert!(!calm.vacuumed.load(Ordering::SeqCst));

        let fragmented = Arc::new(FakeMaintenance::new(40.0));
        let scheduler =
            MaintenanceScheduler::new(fragmented.clone(), MaintenanceConfig::default(), 24);
        assert!(scheduler.run_now(false).await.unwrap().vacuum_run);
        assert!(fragmented.vacuumed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_force_vacuum() {
        let m = Arc::new(FakeMaintenance::new(0.0));
        let scheduler = MaintenanceScheduler::new(m.clone(), MaintenanceConfig::default(), 24);
        assert!(scheduler.run_now(true).await.unwrap().vacuum_run);
    }

    #[tokio::test]
    async fn test_run_fires_immediately_and_stops() {
        let m = Arc::new(FakeMaintenance::new(0.0));
        let scheduler = MaintenanceScheduler::new(m.clone(), MaintenanceConfig::default(), 24);
        let (tx, token) = crate::application::relay::shutdown_channel();

        let handle = tokio::spawn(scheduler.run(token));
        for _ in 0..50 {
            if m.purge_calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(m.purge_calls.load(Ordering::SeqCst), 1);

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
