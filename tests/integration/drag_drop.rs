//! Integration tests for drag-and-drop reassignment between columns.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::redundant_clone)]

use std::sync::Arc;
use std::time::Duration;

use teamboard::board::{Board, FeedPhase};
use teamboard::session::SessionContext;
use teamboard::store::memory::{MemoryStore, WriteRecord};
use teamboard_proto::document::FieldValue;
use teamboard_proto::drag::{DragPayload, encode_task};
use teamboard_proto::task::{Task, TaskId, TaskStatus, fields};

const WAIT: Duration = Duration::from_secs(2);

fn team_session() -> SessionContext {
    SessionContext::new().with_team("team-1")
}

fn make_task(title: &str, status: TaskStatus) -> Task {
    let mut task = Task::draft("team-1", status);
    task.title = title.to_string();
    task
}

async fn open_board(store: &Arc<MemoryStore>) -> Board<MemoryStore> {
    let board = Board::open(store, &team_session());
    board.wait_for_snapshots(WAIT).await;
    assert!(board.columns().iter().all(|c| c.phase() == FeedPhase::Live));
    board
}

fn column_ids(board: &Board<MemoryStore>, status: TaskStatus) -> Vec<TaskId> {
    board
        .column(status)
        .unwrap()
        .current_tasks()
        .into_iter()
        .map(|t| t.id)
        .collect()
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn dragged_task_moves_to_target_column() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("design review", TaskStatus::Todo);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;

    let payload = encode_task(&task.id);
    assert_eq!(DragPayload::decode(&payload), DragPayload::Task(task.id.clone()));

    let report = board
        .column(TaskStatus::InProgress)
        .unwrap()
        .handle_drop(&[payload]);
    assert!(report.accepted());

    // Neither column changes before the store answers.
    assert_eq!(column_ids(&board, TaskStatus::Todo), [task.id.clone()]);
    assert!(column_ids(&board, TaskStatus::InProgress).is_empty());

    report.settled().await;
    wait_until(|| {
        column_ids(&board, TaskStatus::Todo).is_empty()
            && column_ids(&board, TaskStatus::InProgress) == [task.id.clone()]
    })
    .await;
}

#[tokio::test]
async fn drop_writes_only_the_status_field() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("only status", TaskStatus::Todo);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;

    board
        .column(TaskStatus::Completed)
        .unwrap()
        .handle_drop(&[encode_task(&task.id)])
        .settled()
        .await;

    let log = store.write_log();
    assert_eq!(log.len(), 1);
    let WriteRecord::Update { id, fields: map } = &log[0] else {
        panic!("expected an update, got {log:?}");
    };
    assert_eq!(id, task.id.as_str());
    assert_eq!(map.keys().collect::<Vec<_>>(), [fields::STATUS]);
    assert_eq!(
        map.get(fields::STATUS),
        Some(&FieldValue::String("completed".to_string()))
    );

    let stored = Task::from_document(&store.document(task.id.as_str()).unwrap()).unwrap();
    assert_eq!(stored.title, "only status");
    assert_eq!(stored.created_date, task.created_date);
}

#[tokio::test]
async fn self_drop_still_issues_update() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("stay", TaskStatus::InProgress);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;

    let report = board
        .column(TaskStatus::InProgress)
        .unwrap()
        .handle_drop(&[encode_task(&task.id)]);
    assert_eq!(report.reassigned, [task.id.clone()]);
    report.settled().await;

    assert_eq!(
        store.write_log(),
        [WriteRecord::Update {
            id: task.id.to_string(),
            fields: [(
                fields::STATUS.to_string(),
                FieldValue::String("inProgress".to_string())
            )]
            .into_iter()
            .collect(),
        }]
    );
    assert_eq!(column_ids(&board, TaskStatus::InProgress), [task.id.clone()]);
}

#[tokio::test]
async fn malformed_payloads_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("untouched", TaskStatus::Todo);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;

    let report = board.column(TaskStatus::Completed).unwrap().handle_drop(&[
        "",
        "Task",
        "task abc",
        "Note abc",
        "Tag urgent",
        "   ",
    ]);
    assert!(!report.accepted());
    assert_eq!(report.ignored, 6);
    report.settled().await;

    assert!(store.write_log().is_empty());
    assert_eq!(column_ids(&board, TaskStatus::Todo), [task.id.clone()]);
}

#[tokio::test]
async fn extra_tokens_after_id_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("tolerant", TaskStatus::Todo);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;

    let payload = format!("Task   {}  trailing words", task.id);
    board
        .column(TaskStatus::Completed)
        .unwrap()
        .handle_drop(&[payload])
        .settled()
        .await;

    wait_until(|| column_ids(&board, TaskStatus::Completed) == [task.id.clone()]).await;
}

#[tokio::test]
async fn multi_item_drop_moves_every_task() {
    let store = Arc::new(MemoryStore::new());
    let a = make_task("a", TaskStatus::Todo);
    let b = make_task("b", TaskStatus::InProgress);
    store.seed([a.to_document(), b.to_document()]);
    let board = open_board(&store).await;

    let report = board
        .column(TaskStatus::Completed)
        .unwrap()
        .handle_drop(&[encode_task(&a.id), encode_task(&b.id)]);
    assert_eq!(report.reassigned.len(), 2);
    report.settled().await;

    wait_until(|| column_ids(&board, TaskStatus::Completed).len() == 2).await;
    assert!(column_ids(&board, TaskStatus::Todo).is_empty());
    assert!(column_ids(&board, TaskStatus::InProgress).is_empty());
}

#[tokio::test]
async fn later_drop_wins() {
    let store = Arc::new(MemoryStore::new());
    let task = make_task("contested", TaskStatus::Todo);
    store.seed([task.to_document()]);
    let board = open_board(&store).await;
    let payload = encode_task(&task.id);

    board
        .column(TaskStatus::InProgress)
        .unwrap()
        .handle_drop(&[&payload])
        .settled()
        .await;
    board
        .column(TaskStatus::Completed)
        .unwrap()
        .handle_drop(&[&payload])
        .settled()
        .await;

    wait_until(|| column_ids(&board, TaskStatus::Completed) == [task.id.clone()]).await;
    assert!(column_ids(&board, TaskStatus::InProgress).is_empty());
}

#[tokio::test]
async fn dropping_a_deleted_task_fails_quietly() {
    let store = Arc::new(MemoryStore::new());
    let board = open_board(&store).await;
    let ghost = TaskId::generate();

    let report = board
        .column(TaskStatus::Todo)
        .unwrap()
        .handle_drop(&[encode_task(&ghost)]);
    assert!(report.accepted());
    report.settled().await;

    assert!(store.is_empty());
    assert!(board.columns().iter().all(|c| c.phase() == FeedPhase::Live));
}
