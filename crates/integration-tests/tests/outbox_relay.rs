//! Outbox relay against a real SQLite outbox
//!
//! Events staged by the services are delivered in order, failed
//! deliveries back off on the injected clock, exhausted entries are parked
//! and delivered entries are purged by maintenance.

mod common;

use common::Harness;
use taskhub_core::application::task::CreateTaskRequest;
use taskhub_core::domain::{DomainEvent, OutboxState};
use taskhub_core::port::event_publisher::mocks::RecordingPublisher;
use taskhub_core::port::{MaintenanceConfig, OutboxRepository};
use taskhub_infra_sqlite::SqliteOutboxRepository;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

async fn count(h: &Harness, state: OutboxState) -> i64 {
    SqliteOutboxRepository::new(h.pool.clone())
        .count_by_state(state)
        .await
        .unwrap()
}

fn task(title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.to_string(),
        description: String::new(),
        priority: 0,
        due_at: None,
    }
}

#[tokio::test]
async fn test_events_delivered_in_staging_order() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;
    h.clock.advance(10);
    h.tasks.create(&alice, task("first")).await.unwrap();

    let pass = h.relay().relay_once().await.unwrap();
    assert_eq!(pass.delivered, 3);
    assert_eq!(
        h.publisher.topics(),
        vec!["account.registered", "profile.created", "task.created"]
    );

    // Payload is the tagged domain event
    let published = h.publisher.published();
    let event: DomainEvent = serde_json::from_value(published[2].payload().clone()).unwrap();
    assert!(matches!(event, DomainEvent::TaskCreated { ref task } if task.title == "first"));

    assert_eq!(count(&h, OutboxState::Pending).await, 0);
    assert_eq!(count(&h, OutboxState::Delivered).await, 3);

    // Nothing left to do
    assert!(h.relay().relay_once().await.unwrap().is_idle());

    println!("✅ Staged events relayed once, oldest first");
}

#[tokio::test]
async fn test_failed_delivery_is_retried_after_backoff() {
    let h = Harness::with_publisher(RecordingPublisher::failing(1)).await;
    h.register("alice").await;
    let relay = h.relay();

    // First entry fails, the second still goes out
    let pass = relay.relay_once().await.unwrap();
    assert_eq!(pass.rescheduled, 1);
    assert_eq!(pass.delivered, 1);
    assert_eq!(h.publisher.topics(), vec!["profile.created"]);

    let (attempts, last_error): (i64, Option<String>) = sqlx::query_as(
        "SELECT attempts, last_error FROM outbox WHERE topic = 'account.registered'",
    )
    .fetch_one(&h.pool)
    .await
    .unwrap();
    assert_eq!(attempts, 1);
    assert!(last_error.unwrap().contains("broker unavailable"));

    // Not due yet
    assert!(relay.relay_once().await.unwrap().is_idle());

    // Base delay is one second, jitter at most 10%
    h.clock.advance(1_100);
    let pass = relay.relay_once().await.unwrap();
    assert_eq!(pass.delivered, 1);
    assert_eq!(
        h.publisher.topics(),
        vec!["profile.created", "account.registered"]
    );
    assert_eq!(count(&h, OutboxState::Delivered).await, 2);

    println!("✅ Failed delivery rescheduled and delivered after backoff");
}

#[tokio::test]
async fn test_exhausted_entry_is_parked_as_failed() {
    // Two entries, each failing five times
    let h = Harness::with_publisher(RecordingPublisher::failing(10)).await;
    h.register("alice").await;
    let relay = h.relay();

    let mut rescheduled = 0;
    let mut failed = 0;
    for _ in 0..5 {
        let pass = relay.relay_once().await.unwrap();
        rescheduled += pass.rescheduled;
        failed += pass.failed;
        h.clock.advance(60 * 60 * 1000);
    }

    assert_eq!(rescheduled, 8);
    assert_eq!(failed, 2);
    assert_eq!(count(&h, OutboxState::Failed).await, 2);
    assert_eq!(count(&h, OutboxState::Pending).await, 0);

    // Parked on the fifth pass, four hours in
    let failed_at: Vec<Option<i64>> =
        sqlx::query_scalar("SELECT failed_at FROM outbox WHERE state = 'FAILED'")
            .fetch_all(&h.pool)
            .await
            .unwrap();
    let parked_at = common::START_MILLIS + 4 * 60 * 60 * 1000;
    assert!(failed_at.iter().all(|at| *at == Some(parked_at)));

    // Parked entries are never picked up again
    assert!(relay.relay_once().await.unwrap().is_idle());
    assert!(h.publisher.published().is_empty());

    println!("✅ Entries parked as FAILED after max attempts");
}

#[tokio::test]
async fn test_relay_loop_stops_on_shutdown() {
    let h = Harness::new().await;
    h.register("alice").await;

    let relay = h.relay();
    let (shutdown_tx, token) = taskhub_core::application::shutdown_channel();
    let handle = tokio::spawn(async move { relay.run(token).await });

    // Loop picks up the staged events on its own
    for _ in 0..50 {
        if h.publisher.published().len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(h.publisher.published().len(), 2);

    shutdown_tx.shutdown();
    let result = tokio::time::timeout(std::time::Duration::from_secs(2), handle)
        .await
        .expect("relay should stop promptly")
        .unwrap();
    assert!(result.is_ok());

    println!("✅ Relay loop delivers in the background and honours shutdown");
}

#[tokio::test]
async fn test_maintenance_purges_old_delivered_entries() {
    let h = Harness::new().await;
    h.register("alice").await;
    h.relay().relay_once().await.unwrap();

    // A fresh pending entry must survive the purge
    let bob = h.register("bob").await;
    assert!(!bob.is_admin());

    h.clock.advance(8 * DAY_MS);
    let report = h
        .maintenance
        .run_full_maintenance(&MaintenanceConfig::default(), false)
        .await
        .unwrap();
    assert_eq!(report.purged_events, 2);

    let stats = h.maintenance.get_stats().await.unwrap();
    assert_eq!(stats.account_count, 2);
    assert_eq!(stats.outbox_delivered, 0);
    assert_eq!(stats.outbox_pending, 2);

    println!("✅ Delivered entries past retention purged, pending ones kept");
}
