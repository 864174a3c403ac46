//! Taskhub Daemon - Main Entry Point
//! JSON-RPC gateway + outbox relay + maintenance scheduler

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Settings;
use taskhub_api_rpc::{GatewayServices, RpcServer};
use taskhub_core::application::{
    shutdown_channel, AuthService, MaintenanceScheduler, OutboxRelay, ProfileService, TaskService,
};
use taskhub_core::port::id_provider::UuidProvider;
use taskhub_core::port::time_provider::SystemTimeProvider;
use taskhub_core::port::{EventPublisher, IdProvider, Maintenance, TimeProvider, UnitOfWork};
use taskhub_infra_amqp::{AmqpPublisher, TracingPublisher};
use taskhub_infra_auth::{JwtConfig, JwtTokenService, Sha256PasswordHasher};
use taskhub_infra_sqlite::{
    create_pool, run_migrations, SqliteAccountRepository, SqliteMaintenance,
    SqliteOutboxRepository, SqliteProfileRepository, SqliteTaskRepository, SqliteUnitOfWork,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RELAY_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "taskhub-daemon", version, about = "Taskhub daemon")]
struct Args {
    /// Configuration file (toml, yaml or json)
    #[arg(long, env = "TASKHUB_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (before logging: it carries the log settings)
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    // 2. Initialize logging
    let _log_guard = logging::init(&settings.log)?;
    telemetry::report_status();

    info!("Taskhub v{} starting...", VERSION);
    info!(
        rpc = ?settings.rpc,
        amqp_enabled = settings.amqp.enabled,
        auth = ?settings.auth,
        "Configuration loaded"
    );

    // 3. Initialize database
    let db_path = settings.database.expanded_path();
    ensure_parent_dir(&db_path).await?;
    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);
    let uow: Arc<dyn UnitOfWork> = Arc::new(SqliteUnitOfWork::new(pool.clone()));

    let tokens = Arc::new(JwtTokenService::new(
        JwtConfig {
            secret: settings.auth.jwt_secret.clone(),
            issuer: settings.auth.issuer.clone(),
            ttl_secs: settings.auth.token_ttl_secs,
        },
        time_provider.clone(),
    ));
    let hasher = Arc::new(Sha256PasswordHasher::new(settings.auth.hash_iterations));

    let auth = Arc::new(
        AuthService::new(
            uow.clone(),
            Arc::new(SqliteAccountRepository::new(pool.clone())),
            hasher,
            tokens,
            id_provider.clone(),
            time_provider.clone(),
        )
        .with_bootstrap_admin(settings.auth.bootstrap_admin),
    );
    let profiles = Arc::new(ProfileService::new(
        uow.clone(),
        Arc::new(SqliteProfileRepository::new(pool.clone())),
        id_provider.clone(),
        time_provider.clone(),
    ));
    let tasks = Arc::new(TaskService::new(
        uow.clone(),
        Arc::new(SqliteTaskRepository::new(pool.clone())),
        id_provider.clone(),
        time_provider.clone(),
    ));
    let maintenance: Arc<dyn Maintenance> =
        Arc::new(SqliteMaintenance::new(pool.clone(), time_provider.clone()));

    let publisher: Arc<dyn EventPublisher> = if settings.amqp.enabled {
        info!(exchange = %settings.amqp.exchange, "Connecting to RabbitMQ...");
        Arc::new(
            AmqpPublisher::connect(&settings.amqp)
                .await
                .map_err(|e| anyhow::anyhow!("Broker connection failed: {}", e))?,
        )
    } else {
        warn!("Broker disabled; events are logged instead of published");
        Arc::new(TracingPublisher)
    };

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    // 5. Start outbox relay
    info!("Starting outbox relay...");
    let relay = OutboxRelay::new(
        Arc::new(SqliteOutboxRepository::new(pool.clone())),
        publisher,
        time_provider.clone(),
        settings.relay.clone(),
    );
    let relay_token = shutdown_rx.clone();
    let relay_handle = tokio::spawn(async move {
        if let Err(e) = relay.run(relay_token).await {
            error!(error = ?e, "Outbox relay failed");
        }
    });

    // 6. Start maintenance scheduler
    if settings.maintenance.enabled {
        info!("Starting maintenance scheduler...");
        let scheduler = MaintenanceScheduler::new(
            maintenance.clone(),
            settings.maintenance.to_config(),
            settings.maintenance.interval_hours,
        );
        tokio::spawn(scheduler.run(shutdown_rx.clone()));
    }

    // 7. Start JSON-RPC gateway
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(
        settings.rpc.clone(),
        GatewayServices {
            auth,
            profiles,
            tasks,
            maintenance,
            maintenance_config: settings.maintenance.to_config(),
        },
        settings.throttle.clone(),
    );
    let running = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %running.addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    running
        .handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    running.handle.stopped().await;

    if tokio::time::timeout(RELAY_SHUTDOWN_TIMEOUT, relay_handle)
        .await
        .is_err()
    {
        warn!("Outbox relay did not stop in time");
    }

    pool.close().await;
    telemetry::shutdown();
    info!("Shutdown complete.");

    Ok(())
}

async fn ensure_parent_dir(db_path: &str) -> Result<()> {
    if db_path.contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
