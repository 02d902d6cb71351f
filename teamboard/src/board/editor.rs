//! Field-by-field editing of a single task.
//!
//! A [`TaskEditor`] wraps either an unsaved draft or a task that already
//! exists in the store. Drafts collect edits locally until [`save`] creates
//! the document; persisted tasks turn every edit into a one-field partial
//! update so that concurrent editors of different fields never overwrite
//! each other.
//!
//! [`save`]: TaskEditor::save

use std::sync::Arc;

use chrono::{DateTime, Utc};

use teamboard_proto::task::{Difficulty, Task, TaskFieldUpdate, TaskStatus};

use super::EditorError;
use super::writes::{PendingWrite, WriteDispatcher};
use crate::session::SessionContext;
use crate::store::DocumentStore;

/// Editing session for one task.
pub struct TaskEditor<S> {
    task: Task,
    persisted: bool,
    writes: WriteDispatcher<S>,
}

impl<S: DocumentStore> TaskEditor<S> {
    /// Starts a new draft in the session's team with default field values.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoTeam`] if the session has no team.
    pub fn new_draft(
        store: &Arc<S>,
        session: &SessionContext,
        status: TaskStatus,
    ) -> Result<Self, EditorError> {
        let team_id = session.team_id().ok_or(EditorError::NoTeam)?;
        Ok(Self {
            task: Task::draft(team_id, status),
            persisted: false,
            writes: WriteDispatcher::new(Arc::clone(store)),
        })
    }

    /// Edits a task that already exists in the store.
    pub fn existing(store: &Arc<S>, task: Task) -> Self {
        Self {
            task,
            persisted: true,
            writes: WriteDispatcher::new(Arc::clone(store)),
        }
    }

    /// The local copy, including edits not yet reflected by a snapshot.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// `true` once the task exists in the store.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Applies one field edit.
    ///
    /// For a persisted task this issues a partial update carrying only that
    /// field. Drafts are only changed locally and return `None`.
    pub fn apply(&mut self, update: TaskFieldUpdate) -> Option<PendingWrite> {
        update.apply_to(&mut self.task);
        if !self.persisted {
            return None;
        }
        // Progress is clamped locally; write what the task now holds.
        let update = match update {
            TaskFieldUpdate::Progress(_) => TaskFieldUpdate::Progress(self.task.progress),
            other => other,
        };
        Some(self.writes.update(&self.task.id, &update))
    }

    /// Sets the title.
    pub fn set_title(&mut self, title: impl Into<String>) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Title(title.into()))
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Description(description.into()))
    }

    /// Moves the task to another column.
    pub fn set_status(&mut self, status: TaskStatus) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Status(status))
    }

    /// Sets the difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Difficulty(difficulty))
    }

    /// Pins or unpins the task.
    pub fn set_pinned(&mut self, pinned: bool) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Pinned(pinned))
    }

    /// Sets progress, clamped to `[0, 100]`.
    pub fn set_progress(&mut self, progress: f64) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Progress(progress))
    }

    /// Turns the deadline on or off.
    pub fn set_deadline_enabled(&mut self, enabled: bool) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::DeadlineEnabled(enabled))
    }

    /// Sets the deadline. It only shows while the deadline is enabled.
    pub fn set_deadline(&mut self, deadline: DateTime<Utc>) -> Option<PendingWrite> {
        self.apply(TaskFieldUpdate::Deadline(deadline))
    }

    /// Creates the draft in the store.
    ///
    /// Returns `None` if the task was already persisted; later edits become
    /// partial updates either way.
    pub fn save(&mut self) -> Option<PendingWrite> {
        if self.persisted {
            return None;
        }
        self.persisted = true;
        tracing::debug!(task_id = %self.task.id, status = %self.task.status, "saving draft task");
        Some(self.writes.create(self.task.to_document()))
    }

    /// Deletes the task from the store. Discarding a draft writes nothing.
    pub fn delete(self) -> Option<PendingWrite> {
        if !self.persisted {
            tracing::debug!(task_id = %self.task.id, "discarding unsaved draft");
            return None;
        }
        Some(self.writes.delete(&self.task.id))
    }
}
