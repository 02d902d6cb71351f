//! Fire-and-forget writes to the document store.
//!
//! The board never awaits a write in the flow that triggered it. Each write
//! is spawned on the tokio runtime and its outcome is only logged; the next
//! listener snapshot is what the user sees. Nothing here mutates local state
//! optimistically, so there is nothing to roll back on failure.

use std::sync::Arc;

use tokio::task::JoinHandle;

use teamboard_proto::document::Document;
use teamboard_proto::task::{TaskFieldUpdate, TaskId};

use crate::store::DocumentStore;

/// Handle to a spawned write.
///
/// Dropping it detaches the write, which still runs to completion.
/// Awaiting [`settled`](Self::settled) waits for the outcome to be logged.
#[derive(Debug)]
#[must_use = "drop the handle explicitly to make fire-and-forget intent clear"]
pub struct PendingWrite(JoinHandle<()>);

impl PendingWrite {
    /// Waits until the write has completed (successfully or not).
    pub async fn settled(self) {
        if let Err(e) = self.0.await {
            tracing::warn!(error = %e, "write task did not run to completion");
        }
    }

    /// Returns `true` once the write has completed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.0.is_finished()
    }
}

/// Spawns store writes and logs their outcome.
pub struct WriteDispatcher<S> {
    store: Arc<S>,
}

impl<S> Clone for WriteDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> WriteDispatcher<S> {
    /// Creates a dispatcher writing to `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a task document.
    pub fn create(&self, document: Document) -> PendingWrite {
        let store = Arc::clone(&self.store);
        PendingWrite(tokio::spawn(async move {
            let id = document.id.clone();
            match store.create(document).await {
                Ok(()) => tracing::debug!(task_id = %id, "task created"),
                Err(e) => tracing::warn!(task_id = %id, error = %e, "task create failed"),
            }
        }))
    }

    /// Writes a single task field.
    pub fn update(&self, id: &TaskId, update: &TaskFieldUpdate) -> PendingWrite {
        let store = Arc::clone(&self.store);
        let id = id.clone();
        let field = update.field_name();
        let fields = update.to_field_map();
        PendingWrite(tokio::spawn(async move {
            match store.update_fields(id.as_str(), fields).await {
                Ok(()) => tracing::debug!(task_id = %id, field, "task field updated"),
                Err(e) => {
                    tracing::warn!(task_id = %id, field, error = %e, "task field update failed");
                }
            }
        }))
    }

    /// Deletes a task.
    pub fn delete(&self, id: &TaskId) -> PendingWrite {
        let store = Arc::clone(&self.store);
        let id = id.clone();
        PendingWrite(tokio::spawn(async move {
            match store.delete(id.as_str()).await {
                Ok(()) => tracing::debug!(task_id = %id, "task deleted"),
                Err(e) => tracing::warn!(task_id = %id, error = %e, "task delete failed"),
            }
        }))
    }
}
