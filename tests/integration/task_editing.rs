//! Integration tests for creating, editing and deleting tasks.
//!
//! Every edit of a persisted task must reach the store as a partial update
//! of exactly one field, so two people editing different fields of the same
//! task never overwrite each other.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::redundant_clone)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use teamboard::board::{Board, EditorError, TaskEditor};
use teamboard::session::SessionContext;
use teamboard::store::memory::{MemoryStore, WriteRecord};
use teamboard_proto::document::FieldValue;
use teamboard_proto::task::{Difficulty, Task, TaskStatus, fields};

const WAIT: Duration = Duration::from_secs(2);

fn team_session() -> SessionContext {
    SessionContext::new().with_user("alice").with_team("team-1")
}

fn stored_task(store: &MemoryStore, task: &Task) -> Task {
    Task::from_document(&store.document(task.id.as_str()).unwrap()).unwrap()
}

fn seeded_task(store: &MemoryStore, title: &str) -> Task {
    let mut task = Task::draft("team-1", TaskStatus::Todo);
    task.title = title.to_string();
    store.seed([task.to_document()]);
    task
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
async fn title_edit_sends_single_field() {
    let store = Arc::new(MemoryStore::new());
    let task = seeded_task(&store, "before");

    let mut editor = TaskEditor::existing(&store, task.clone());
    editor.set_title("after").unwrap().settled().await;

    assert_eq!(
        store.write_log(),
        [WriteRecord::Update {
            id: task.id.to_string(),
            fields: [(
                fields::TITLE.to_string(),
                FieldValue::String("after".to_string())
            )]
            .into_iter()
            .collect(),
        }]
    );
    assert_eq!(stored_task(&store, &task).title, "after");
}

#[tokio::test]
async fn each_edit_is_its_own_write() {
    let store = Arc::new(MemoryStore::new());
    let task = seeded_task(&store, "busy");
    let deadline = Utc.with_ymd_and_hms(2030, 1, 15, 9, 0, 0).unwrap();

    let mut editor = TaskEditor::existing(&store, task.clone());
    let pending = [
        editor.set_description("more detail"),
        editor.set_difficulty(Difficulty::Normal),
        editor.set_pinned(true),
        editor.set_progress(40.0),
        editor.set_deadline_enabled(true),
        editor.set_deadline(deadline),
    ];
    for write in pending {
        write.unwrap().settled().await;
    }

    let log = store.write_log();
    assert_eq!(log.len(), 6);
    for record in &log {
        let WriteRecord::Update { fields: map, .. } = record else {
            panic!("expected only updates, got {record:?}");
        };
        assert_eq!(map.len(), 1);
    }

    let stored = stored_task(&store, &task);
    assert_eq!(stored.description, "more detail");
    assert_eq!(stored.difficulty, Difficulty::Normal);
    assert!(stored.is_pinned);
    assert!((stored.progress - 40.0).abs() < f64::EPSILON);
    assert!(stored.is_deadline_enabled);
    assert_eq!(stored.deadline, deadline);
    assert_eq!(stored.title, "busy");
}

#[tokio::test]
async fn concurrent_editors_of_different_fields_both_win() {
    let store = Arc::new(MemoryStore::new());
    let task = seeded_task(&store, "shared");

    let mut alice = TaskEditor::existing(&store, task.clone());
    let mut bob = TaskEditor::existing(&store, task.clone());
    let a = alice.set_title("renamed by alice").unwrap();
    let b = bob.set_progress(75.0).unwrap();
    a.settled().await;
    b.settled().await;

    let stored = stored_task(&store, &task);
    assert_eq!(stored.title, "renamed by alice");
    assert!((stored.progress - 75.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn saved_draft_appears_in_its_column() {
    let store = Arc::new(MemoryStore::new());
    let board = Board::open(&store, &team_session());
    board.wait_for_snapshots(WAIT).await;

    let mut editor = TaskEditor::new_draft(&store, &team_session(), TaskStatus::InProgress).unwrap();
    assert!(editor.set_title("fresh").is_none());
    assert!(editor.set_difficulty(Difficulty::VeryHard).is_none());

    let draft = editor.task().clone();
    assert_eq!(draft.description, "");
    assert!(!draft.is_pinned);
    assert!(!draft.is_deadline_enabled);
    assert!(draft.progress.abs() < f64::EPSILON);
    assert!(store.is_empty());

    editor.save().unwrap().settled().await;
    let column = board.column(TaskStatus::InProgress).unwrap();
    wait_until(|| column.task(&draft.id).is_some()).await;
    assert_eq!(column.task(&draft.id).unwrap(), draft);
    assert_eq!(store.write_log(), [WriteRecord::Create { id: draft.id.to_string() }]);
}

#[tokio::test]
async fn edits_after_save_are_partial_updates() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = TaskEditor::new_draft(&store, &team_session(), TaskStatus::Todo).unwrap();
    editor.save().unwrap().settled().await;

    editor.set_status(TaskStatus::Completed).unwrap().settled().await;
    let log = store.write_log();
    assert!(matches!(&log[..], [WriteRecord::Create { .. }, WriteRecord::Update { .. }]));
    assert_eq!(stored_task(&store, editor.task()).status, TaskStatus::Completed);
}

#[tokio::test]
async fn draft_without_team_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let session = SessionContext::new().with_user("alice");
    let result = TaskEditor::new_draft(&store, &session, TaskStatus::Todo);
    assert!(matches!(result, Err(EditorError::NoTeam)));
}

#[tokio::test]
async fn deleted_task_disappears_on_next_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let task = seeded_task(&store, "doomed");
    let board = Board::open(&store, &team_session());
    board.wait_for_snapshots(WAIT).await;
    let column = board.column(TaskStatus::Todo).unwrap();
    assert!(column.task(&task.id).is_some());

    let editor = TaskEditor::existing(&store, task.clone());
    let pending = editor.delete().unwrap();
    // Still shown until the store answers.
    assert!(column.task(&task.id).is_some());

    pending.settled().await;
    wait_until(|| column.task(&task.id).is_none()).await;
    assert!(board.find_task(&task.id).is_none());
}

#[tokio::test]
async fn deleting_twice_is_harmless() {
    let store = Arc::new(MemoryStore::new());
    let task = seeded_task(&store, "gone");

    TaskEditor::existing(&store, task.clone())
        .delete()
        .unwrap()
        .settled()
        .await;
    TaskEditor::existing(&store, task.clone())
        .delete()
        .unwrap()
        .settled()
        .await;

    assert!(store.is_empty());
    assert_eq!(store.write_log().len(), 2);
}
