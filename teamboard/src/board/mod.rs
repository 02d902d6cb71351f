//! Realtime task board.
//!
//! A [`Board`] is one [`TaskColumn`] per [`TaskStatus`], each backed by its
//! own store listener. Columns never mutate their lists locally: drags,
//! edits and deletes go to the store as fire-and-forget writes and come back
//! as snapshots.

pub mod column;
pub mod drag;
pub mod editor;
pub mod feed;
pub mod writes;

pub use column::TaskColumn;
pub use drag::{DropHandler, DropReport};
pub use editor::TaskEditor;
pub use feed::{FeedPhase, RemoteTaskFeed};
pub use writes::{PendingWrite, WriteDispatcher};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use teamboard_proto::task::{Task, TaskId, TaskStatus};

use crate::session::SessionContext;
use crate::store::DocumentStore;

/// Errors that can occur when starting an edit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    /// New tasks need a team to belong to.
    #[error("no team selected")]
    NoTeam,
}

/// All columns of one team's board.
pub struct Board<S> {
    columns: Vec<TaskColumn<S>>,
}

impl<S: DocumentStore> Board<S> {
    /// Opens a column for every status, in display order.
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(store: &Arc<S>, session: &SessionContext) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| TaskColumn::open(store, session, status))
            .collect();
        tracing::info!(team_id = ?session.team_id(), "board opened");
        Self { columns }
    }

    /// The column showing `status`.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Option<&TaskColumn<S>> {
        self.columns.iter().find(|c| c.status() == status)
    }

    /// All columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[TaskColumn<S>] {
        &self.columns
    }

    /// Finds a task in whichever column currently shows it.
    #[must_use]
    pub fn find_task(&self, id: &TaskId) -> Option<Task> {
        self.columns.iter().find_map(|c| c.task(id))
    }

    /// Experience earned from completed tasks.
    #[must_use]
    pub fn experience_earned(&self) -> u32 {
        self.column(TaskStatus::Completed)
            .map_or(0, TaskColumn::experience_points)
    }

    /// Waits for every column to leave [`FeedPhase::AwaitingFirstSnapshot`],
    /// giving each column at most `timeout`.
    pub async fn wait_for_snapshots(&self, timeout: Duration) {
        for column in &self.columns {
            let phase = column.wait_for_snapshot(timeout).await;
            if phase == FeedPhase::AwaitingFirstSnapshot {
                tracing::warn!(status = %column.status(), "no snapshot before timeout");
            }
        }
    }

    /// Tears down every column.
    pub fn teardown(&mut self) {
        for column in &mut self.columns {
            column.teardown();
        }
    }
}
