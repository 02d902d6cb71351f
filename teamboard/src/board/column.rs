//! One board column: the live task list for a single status.
//!
//! [`TaskColumn`] is a read-mostly projection of the store. It renders
//! whatever the last snapshot said and forwards mutations to the store
//! without touching its own list; the next snapshot is authoritative.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use teamboard_proto::task::{Task, TaskFieldUpdate, TaskId, TaskStatus};

use super::drag::{DropHandler, DropReport};
use super::feed::{FeedPhase, RemoteTaskFeed};
use super::writes::{PendingWrite, WriteDispatcher};
use crate::session::SessionContext;
use crate::store::DocumentStore;

/// Task list state of one status column.
pub struct TaskColumn<S> {
    feed: RemoteTaskFeed,
    writes: WriteDispatcher<S>,
    drops: DropHandler<S>,
}

impl<S: DocumentStore> TaskColumn<S> {
    /// Opens the column and subscribes to its tasks.
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(store: &Arc<S>, session: &SessionContext, status: TaskStatus) -> Self {
        let writes = WriteDispatcher::new(Arc::clone(store));
        Self {
            feed: RemoteTaskFeed::subscribe(store.as_ref(), session, status),
            drops: DropHandler::new(status, writes.clone()),
            writes,
        }
    }

    /// The status this column shows. Fixed for the column's lifetime.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.feed.status()
    }

    /// Lifecycle phase of the underlying feed.
    #[must_use]
    pub fn phase(&self) -> FeedPhase {
        self.feed.phase()
    }

    /// The most recent snapshot, or empty if none has arrived yet.
    #[must_use]
    pub fn current_tasks(&self) -> Vec<Task> {
        self.feed.current_tasks()
    }

    /// A receiver notified whenever the list is replaced.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<Task>> {
        self.feed.watch()
    }

    /// Finds a task in the current list.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.feed
            .with_tasks(|tasks| tasks.iter().find(|t| t.id == *id).cloned())
    }

    /// Waits until the feed leaves [`FeedPhase::AwaitingFirstSnapshot`] or
    /// `timeout` passes, and returns the phase reached.
    pub async fn wait_for_snapshot(&self, timeout: Duration) -> FeedPhase {
        let mut phases = self.feed.watch_phase();
        let _ = tokio::time::timeout(
            timeout,
            phases.wait_for(|phase| *phase != FeedPhase::AwaitingFirstSnapshot),
        )
        .await;
        self.phase()
    }

    /// Sum of the experience points of the tasks currently shown.
    #[must_use]
    pub fn experience_points(&self) -> u32 {
        self.feed.with_tasks(|tasks| {
            tasks
                .iter()
                .map(|t| t.difficulty.experience_points())
                .sum()
        })
    }

    /// Deletes a task. Fire-and-forget; the list changes with the next
    /// snapshot.
    pub fn request_delete(&self, id: &TaskId) -> PendingWrite {
        tracing::debug!(task_id = %id, column = %self.status(), "delete requested");
        self.writes.delete(id)
    }

    /// Moves a task to `status`. Fire-and-forget; only the status field is
    /// written.
    pub fn request_status_change(&self, id: &TaskId, status: TaskStatus) -> PendingWrite {
        tracing::debug!(task_id = %id, from = %self.status(), to = %status, "status change requested");
        self.writes.update(id, &TaskFieldUpdate::Status(status))
    }

    /// Handles payloads dropped onto this column.
    pub fn handle_drop<P: AsRef<str>>(&self, payloads: &[P]) -> DropReport {
        self.drops.handle_drop(payloads)
    }

    /// Stops listening. The list is frozen afterwards.
    pub fn teardown(&mut self) {
        self.feed.teardown();
    }
}
