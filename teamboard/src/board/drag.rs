//! Drop handling for moving tasks between columns.
//!
//! A drop zone decodes every dropped payload once into a
//! [`DragPayload`] and reassigns each dropped task to its own status with a
//! fire-and-forget partial update. The column the task left keeps showing it
//! until the next snapshot of each column arrives.

use teamboard_proto::drag::DragPayload;
use teamboard_proto::task::{TaskFieldUpdate, TaskId, TaskStatus};

use super::writes::{PendingWrite, WriteDispatcher};
use crate::store::DocumentStore;

/// Outcome of one drop gesture.
#[derive(Debug, Default)]
pub struct DropReport {
    /// Tasks whose status update was issued, in payload order.
    pub reassigned: Vec<TaskId>,
    /// Payloads that were not tasks and were ignored.
    pub ignored: usize,
    pending: Vec<PendingWrite>,
}

impl DropReport {
    /// `true` if at least one task was reassigned.
    #[must_use]
    pub fn accepted(&self) -> bool {
        !self.reassigned.is_empty()
    }

    /// Waits for every issued update to complete.
    pub async fn settled(self) {
        futures_util::future::join_all(self.pending.into_iter().map(PendingWrite::settled)).await;
    }
}

/// Drop target for one status column.
pub struct DropHandler<S> {
    target: TaskStatus,
    writes: WriteDispatcher<S>,
}

impl<S: DocumentStore> DropHandler<S> {
    /// Creates a drop handler that moves tasks into `target`.
    #[must_use]
    pub const fn new(target: TaskStatus, writes: WriteDispatcher<S>) -> Self {
        Self { target, writes }
    }

    /// Status dropped tasks are moved to.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }

    /// Handles the payloads of one drop.
    ///
    /// Every task payload issues its own status update, even when the task
    /// already has the target status. Other payloads are ignored.
    pub fn handle_drop<P: AsRef<str>>(&self, payloads: &[P]) -> DropReport {
        let mut report = DropReport::default();
        for raw in payloads {
            match DragPayload::decode(raw.as_ref()) {
                DragPayload::Task(id) => {
                    tracing::debug!(task_id = %id, target = %self.target, "task dropped on column");
                    let pending = self
                        .writes
                        .update(&id, &TaskFieldUpdate::Status(self.target));
                    report.pending.push(pending);
                    report.reassigned.push(id);
                }
                DragPayload::Tag(tag) => {
                    tracing::debug!(tag = %tag, target = %self.target, "ignoring tag dropped on column");
                    report.ignored += 1;
                }
                DragPayload::Unknown => {
                    tracing::debug!(target = %self.target, "ignoring unrecognised drop payload");
                    report.ignored += 1;
                }
            }
        }
        report
    }
}
