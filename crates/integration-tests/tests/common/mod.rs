//! Shared wiring for the cross-crate scenarios: in-memory SQLite, real
//! adapters, a manual clock and a recording publisher.

#![allow(dead_code)]

use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use taskhub_core::application::auth::RegisterRequest;
use taskhub_core::application::{AuthService, OutboxRelay, ProfileService, RelayConfig, TaskService};
use taskhub_core::domain::Principal;
use taskhub_core::port::event_publisher::mocks::RecordingPublisher;
use taskhub_core::port::id_provider::UuidProvider;
use taskhub_core::port::time_provider::ManualClock;
use taskhub_core::port::{EventPublisher, IdProvider, Maintenance, TimeProvider, UnitOfWork};
use taskhub_infra_auth::{JwtConfig, JwtTokenService, Sha256PasswordHasher};
use taskhub_infra_sqlite::{
    create_pool, run_migrations, SqliteAccountRepository, SqliteMaintenance,
    SqliteOutboxRepository, SqliteProfileRepository, SqliteTaskRepository, SqliteUnitOfWork,
};

pub const START_MILLIS: i64 = 1_700_000_000_000;
pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct horse battery";

pub struct Harness {
    pub pool: SqlitePool,
    pub clock: Arc<ManualClock>,
    pub publisher: Arc<RecordingPublisher>,
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub tasks: Arc<TaskService>,
    pub maintenance: Arc<dyn Maintenance>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_publisher(RecordingPublisher::new()).await
    }

    pub async fn with_publisher(publisher: RecordingPublisher) -> Self {
        Self::build(":memory:", publisher).await
    }

    /// File-backed database, for scenarios that need several connections
    pub async fn on_disk(path: &Path) -> Self {
        Self::build(&path.to_string_lossy(), RecordingPublisher::new()).await
    }

    async fn build(database_url: &str, publisher: RecordingPublisher) -> Self {
        let pool = create_pool(database_url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let time: Arc<dyn TimeProvider> = clock.clone();
        let ids: Arc<dyn IdProvider> = Arc::new(UuidProvider);
        let uow: Arc<dyn UnitOfWork> = Arc::new(SqliteUnitOfWork::new(pool.clone()));

        let tokens = Arc::new(JwtTokenService::new(
            JwtConfig {
                secret: SECRET.to_string(),
                issuer: "taskhub-test".to_string(),
                ttl_secs: 3600,
            },
            time.clone(),
        ));

        let auth = Arc::new(
            AuthService::new(
                uow.clone(),
                Arc::new(SqliteAccountRepository::new(pool.clone())),
                // Few iterations keep the suite fast
                Arc::new(Sha256PasswordHasher::new(10)),
                tokens,
                ids.clone(),
                time.clone(),
            )
            .with_bootstrap_admin(true),
        );
        let profiles = Arc::new(ProfileService::new(
            uow.clone(),
            Arc::new(SqliteProfileRepository::new(pool.clone())),
            ids.clone(),
            time.clone(),
        ));
        let tasks = Arc::new(TaskService::new(
            uow,
            Arc::new(SqliteTaskRepository::new(pool.clone())),
            ids,
            time.clone(),
        ));
        let maintenance: Arc<dyn Maintenance> =
            Arc::new(SqliteMaintenance::new(pool.clone(), time));

        Self {
            pool,
            clock,
            publisher: Arc::new(publisher),
            auth,
            profiles,
            tasks,
            maintenance,
        }
    }

    pub fn relay(&self) -> OutboxRelay {
        let publisher: Arc<dyn EventPublisher> = self.publisher.clone();
        OutboxRelay::new(
            Arc::new(SqliteOutboxRepository::new(self.pool.clone())),
            publisher,
            self.clock.clone(),
            RelayConfig::default(),
        )
    }

    /// Register `username` and return its principal
    pub async fn register(&self, username: &str) -> Principal {
        let registration = self
            .auth
            .register(RegisterRequest {
                username: username.to_string(),
                password: PASSWORD.to_string(),
                display_name: format!("{} display", username),
                email: format!("{}@example.com", username),
            })
            .await
            .unwrap();
        Principal::from(&registration.account)
    }

    pub async fn outbox_topics(&self) -> Vec<String> {
        sqlx::query_scalar("SELECT topic FROM outbox ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}
