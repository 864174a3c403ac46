//! Task lifecycle through TaskService backed by SQLite
//!
//! Ownership isolation, status machine, listing order/filters and the
//! events each mutation stages.

mod common;

use async_trait::async_trait;
use common::Harness;
use std::sync::Arc;
use taskhub_core::application::task::CreateTaskRequest;
use taskhub_core::application::TaskService;
use taskhub_core::domain::{AccountId, DomainError, Task, TaskAction, TaskId, TaskPatch, TaskStatus};
use taskhub_core::port::id_provider::UuidProvider;
use taskhub_core::port::{TaskFilter, TaskRepository};
use taskhub_core::AppError;
use taskhub_infra_sqlite::SqliteUnitOfWork;

/// Read side frozen at an earlier snapshot, as seen by a request that
/// loaded the task before a concurrent change committed
struct SnapshotTasks(Task);

#[async_trait]
impl TaskRepository for SnapshotTasks {
    async fn find_by_id(&self, _id: &TaskId) -> taskhub_core::Result<Option<Task>> {
        Ok(Some(self.0.clone()))
    }

    async fn find_by_owner(
        &self,
        _owner_id: &AccountId,
        _filter: &TaskFilter,
    ) -> taskhub_core::Result<Vec<Task>> {
        Ok(vec![self.0.clone()])
    }

    async fn count_by_status(
        &self,
        _owner_id: &AccountId,
    ) -> taskhub_core::Result<Vec<(TaskStatus, i64)>> {
        Ok(vec![])
    }
}

fn service_seeing(h: &Harness, snapshot: Task) -> TaskService {
    TaskService::new(
        Arc::new(SqliteUnitOfWork::new(h.pool.clone())),
        Arc::new(SnapshotTasks(snapshot)),
        Arc::new(UuidProvider),
        h.clock.clone(),
    )
}

fn new_task(title: &str, priority: i32) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.to_string(),
        description: String::new(),
        priority,
        due_at: None,
    }
}

#[tokio::test]
async fn test_task_crud_and_events() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;

    let task = h.tasks.create(&alice, new_task("  write docs  ", 3)).await.unwrap();
    assert_eq!(task.title, "write docs");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.owner_id, alice.account_id);

    h.clock.advance(1_000);
    let patch = TaskPatch {
        description: Some("user guide".to_string()),
        due_at: Some(Some(common::START_MILLIS + 86_400_000)),
        ..Default::default()
    };
    let updated = h.tasks.update(&alice, &task.id, patch).await.unwrap();
    assert_eq!(updated.description, "user guide");
    assert_eq!(updated.updated_at, common::START_MILLIS + 1_000);

    // Clearing the due date
    let cleared = h
        .tasks
        .update(
            &alice,
            &task.id,
            TaskPatch {
                due_at: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.due_at, None);

    let reloaded = h.tasks.get(&alice, &task.id).await.unwrap();
    assert_eq!(reloaded.description, "user guide");
    assert_eq!(reloaded.due_at, None);

    h.tasks.delete(&alice, &task.id).await.unwrap();
    assert!(h.tasks.get(&alice, &task.id).await.unwrap_err().is_not_found());

    let topics = h.outbox_topics().await;
    assert_eq!(
        &topics[2..],
        &["task.created", "task.updated", "task.updated", "task.deleted"]
    );

    println!("✅ Task create/update/delete persisted with matching events");
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;
    let task = h.tasks.create(&alice, new_task("t", 0)).await.unwrap();

    let err = h
        .tasks
        .update(&alice, &task.id, TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    println!("✅ Empty patch rejected");
}

#[tokio::test]
async fn test_status_machine() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;
    let task = h.tasks.create(&alice, new_task("ship", 5)).await.unwrap();

    let started = h.tasks.transition(&alice, &task.id, TaskAction::Start).await.unwrap();
    assert_eq!(started.status, TaskStatus::InProgress);

    h.clock.advance(60_000);
    let done = h.tasks.transition(&alice, &task.id, TaskAction::Complete).await.unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.completed_at, Some(common::START_MILLIS + 60_000));

    let reopened = h.tasks.transition(&alice, &task.id, TaskAction::Reopen).await.unwrap();
    assert_eq!(reopened.status, TaskStatus::Todo);
    assert_eq!(reopened.completed_at, None);

    let archived = h.tasks.transition(&alice, &task.id, TaskAction::Archive).await.unwrap();
    assert_eq!(archived.status, TaskStatus::Archived);

    // Archived is terminal
    let err = h
        .tasks
        .transition(&alice, &task.id, TaskAction::Start)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidStateTransition { ref from, ref to })
            if from == "ARCHIVED" && to == "IN_PROGRESS"
    ));

    let edit = TaskPatch {
        title: Some("renamed".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        h.tasks.update(&alice, &task.id, edit).await.unwrap_err(),
        AppError::Domain(DomainError::InvalidStateTransition { .. })
    ));

    let changes = h
        .outbox_topics()
        .await
        .into_iter()
        .filter(|t| t == "task.status_changed")
        .count();
    assert_eq!(changes, 4);

    println!("✅ Status transitions enforced, archived tasks frozen");
}

#[tokio::test]
async fn test_other_users_tasks_are_not_found() {
    let h = Harness::new().await;
    let admin = h.register("alice").await;
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;

    let task = h.tasks.create(&bob, new_task("private", 1)).await.unwrap();

    assert!(h.tasks.get(&carol, &task.id).await.unwrap_err().is_not_found());
    assert!(h
        .tasks
        .transition(&carol, &task.id, TaskAction::Complete)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(h.tasks.delete(&carol, &task.id).await.unwrap_err().is_not_found());

    // Admins see everything
    let seen = h.tasks.get(&admin, &task.id).await.unwrap();
    assert_eq!(seen.owner_id, bob.account_id);

    assert!(h.tasks.list(&carol, TaskFilter::default()).await.unwrap().is_empty());

    println!("✅ Foreign tasks hidden from non-owners, visible to admins");
}

#[tokio::test]
async fn test_list_order_filter_and_summary() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;

    let low = h.tasks.create(&alice, new_task("low", 1)).await.unwrap();
    h.clock.advance(1);
    let high = h.tasks.create(&alice, new_task("high", 9)).await.unwrap();
    h.clock.advance(1);
    let mid = h.tasks.create(&alice, new_task("mid", 5)).await.unwrap();
    h.clock.advance(1);
    let mid_later = h.tasks.create(&alice, new_task("mid later", 5)).await.unwrap();

    let all = h.tasks.list(&alice, TaskFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![high.id.clone(), mid.id.clone(), mid_later.id.clone(), low.id.clone()]);

    h.tasks.transition(&alice, &mid.id, TaskAction::Start).await.unwrap();
    h.tasks.transition(&alice, &low.id, TaskAction::Complete).await.unwrap();

    let in_progress = h
        .tasks
        .list(
            &alice,
            TaskFilter {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, mid.id);

    let page = h
        .tasks
        .list(
            &alice,
            TaskFilter {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, mid.id);

    let summary = h.tasks.summary(&alice).await.unwrap();
    assert_eq!(
        summary,
        vec![
            (TaskStatus::Todo, 2),
            (TaskStatus::InProgress, 1),
            (TaskStatus::Done, 1),
            (TaskStatus::Archived, 0),
        ]
    );

    println!("✅ Listing ordered by priority then age, filters and summary correct");
}

#[tokio::test]
async fn test_invalid_task_is_rejected_without_event() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;

    let err = h.tasks.create(&alice, new_task("   ", 0)).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::Validation(_))));

    let err = h.tasks.create(&alice, new_task("too urgent", 11)).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::Validation(_))));

    assert!(!h.outbox_topics().await.iter().any(|t| t == "task.created"));

    println!("✅ Invalid tasks rejected before anything is written");
}

#[tokio::test]
async fn test_edit_from_stale_read_cannot_revive_archived_task() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;
    let task = h.tasks.create(&alice, new_task("draft", 2)).await.unwrap();

    // Snapshot taken before the archive commits
    let stale = service_seeing(&h, task.clone());
    h.tasks.transition(&alice, &task.id, TaskAction::Archive).await.unwrap();

    let edit = TaskPatch {
        title: Some("edited".to_string()),
        ..Default::default()
    };
    let err = stale.update(&alice, &task.id, edit).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidStateTransition { ref from, .. }) if from == "ARCHIVED"
    ));

    let err = stale
        .transition(&alice, &task.id, TaskAction::Start)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidStateTransition { .. })
    ));

    let current = h.tasks.get(&alice, &task.id).await.unwrap();
    assert_eq!(current.status, TaskStatus::Archived);
    assert_eq!(current.title, "draft");

    println!("✅ Writes apply to the committed row, archived stays archived");
}

#[tokio::test]
async fn test_status_event_reports_committed_previous_status() {
    let h = Harness::new().await;
    let alice = h.register("alice").await;
    let task = h.tasks.create(&alice, new_task("ship", 2)).await.unwrap();

    let stale = service_seeing(&h, task.clone());
    h.tasks.transition(&alice, &task.id, TaskAction::Start).await.unwrap();

    let done = stale
        .transition(&alice, &task.id, TaskAction::Complete)
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);

    let payload: String = sqlx::query_scalar(
        "SELECT payload FROM outbox WHERE topic = 'task.status_changed' ORDER BY rowid DESC LIMIT 1",
    )
    .fetch_one(&h.pool)
    .await
    .unwrap();
    let event: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(event["from"], "IN_PROGRESS");
    assert_eq!(event["to"], "DONE");

    println!("✅ Status change event carries the status actually replaced");
}

#[tokio::test]
async fn test_concurrent_edit_and_archive_end_archived() {
    let dir = tempfile::tempdir().unwrap();
    let h = Arc::new(Harness::on_disk(&dir.path().join("taskhub.db")).await);
    let alice = h.register("alice").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let task = h.tasks.create(&alice, new_task(&format!("t{}", i), 1)).await.unwrap();
        let (h1, h2) = (h.clone(), h.clone());
        let (p1, p2) = (alice.clone(), alice.clone());
        let (id1, id2) = (task.id.clone(), task.id.clone());
        handles.push(tokio::spawn(async move {
            let edit = TaskPatch {
                title: Some("edited".to_string()),
                ..Default::default()
            };
            // Loses the race when the archive commits first
            let _ = h1.tasks.update(&p1, &id1, edit).await;
        }));
        handles.push(tokio::spawn(async move {
            h2.tasks.transition(&p2, &id2, TaskAction::Archive).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let archived = h
        .tasks
        .list(
            &alice,
            TaskFilter {
                status: Some(TaskStatus::Archived),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(archived.len(), 8);

    println!("✅ Concurrent edits never undo an archive");
}
