//! Realtime feed of one board column.
//!
//! A [`RemoteTaskFeed`] opens a single store listener for
//! `(team, status)`, decodes each snapshot into [`Task`]s and publishes the
//! whole list as a replacement of the previous one. Ordering comes from the
//! store query; the feed never re-sorts.
//!
//! ```text
//!  Idle (no team) ──────────────────────────────┐
//!  AwaitingFirstSnapshot ─snapshot─▶ Live ─┐     │
//!          │                         │     │     ▼
//!          └────────error────────▶ Failed ─┴─▶ TornDown
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use teamboard_proto::query::TaskQuery;
use teamboard_proto::task::{Task, TaskStatus};

use crate::session::SessionContext;
use crate::store::{DocumentStore, ListenerRegistration, QuerySnapshot, SnapshotReceiver};

/// Lifecycle phase of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// No team in the session; never subscribes.
    Idle,
    /// Subscribed, no snapshot yet.
    AwaitingFirstSnapshot,
    /// Subscribed and holding data.
    Live,
    /// The listener failed or could not be opened; the last list is kept.
    Failed,
    /// Torn down; terminal.
    TornDown,
}

struct FeedShared {
    phase: watch::Sender<FeedPhase>,
    snapshots: u64,
    tasks: watch::Sender<Vec<Task>>,
}

/// Live subscription to the tasks of one team and status.
///
/// Must be created inside a tokio runtime. Dropping the feed tears it down.
pub struct RemoteTaskFeed {
    status: TaskStatus,
    shared: Arc<Mutex<FeedShared>>,
    tasks_rx: watch::Receiver<Vec<Task>>,
    phase_rx: watch::Receiver<FeedPhase>,
    registration: Option<ListenerRegistration>,
    pump: Option<JoinHandle<()>>,
}

impl RemoteTaskFeed {
    /// Subscribes to the column `status` of the session's team.
    ///
    /// Returns immediately; the first snapshot arrives asynchronously.
    /// Without a team the feed stays [`FeedPhase::Idle`] and empty.
    pub fn subscribe<S: DocumentStore>(
        store: &S,
        session: &SessionContext,
        status: TaskStatus,
    ) -> Self {
        let (tx, tasks_rx) = watch::channel(Vec::new());
        let (phase_tx, phase_rx) = watch::channel(FeedPhase::Idle);
        let mut feed = Self {
            status,
            shared: Arc::new(Mutex::new(FeedShared {
                phase: phase_tx,
                snapshots: 0,
                tasks: tx,
            })),
            tasks_rx,
            phase_rx,
            registration: None,
            pump: None,
        };

        let Some(team_id) = session.team_id() else {
            tracing::debug!(%status, "no team in session, feed stays idle");
            return feed;
        };

        let query = TaskQuery::column(team_id, status);
        match store.subscribe(&query) {
            Ok((registration, events)) => {
                feed.shared.lock().phase.send_replace(FeedPhase::AwaitingFirstSnapshot);
                feed.registration = Some(registration);
                feed.pump = Some(tokio::spawn(pump_snapshots(
                    status,
                    Arc::clone(&feed.shared),
                    events,
                )));
                tracing::debug!(team_id, %status, "task feed subscribed");
            }
            Err(e) => {
                tracing::warn!(team_id, %status, error = %e, "could not open task listener");
                feed.shared.lock().phase.send_replace(FeedPhase::Failed);
            }
        }
        feed
    }

    /// Status of the column this feed serves.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> FeedPhase {
        *self.phase_rx.borrow()
    }

    /// A receiver notified on every phase change.
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<FeedPhase> {
        self.phase_rx.clone()
    }

    /// Number of snapshots published so far.
    #[must_use]
    pub fn snapshot_count(&self) -> u64 {
        self.shared.lock().snapshots
    }

    /// The most recent snapshot, or empty if none has arrived.
    #[must_use]
    pub fn current_tasks(&self) -> Vec<Task> {
        self.tasks_rx.borrow().clone()
    }

    /// Runs `f` on the current list without cloning it.
    pub fn with_tasks<R>(&self, f: impl FnOnce(&[Task]) -> R) -> R {
        f(&self.tasks_rx.borrow())
    }

    /// A receiver notified on every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks_rx.clone()
    }

    /// Detaches the listener and stops all further delivery.
    ///
    /// Synchronous: once this returns, the published list can no longer
    /// change. Calling it again is a no-op.
    pub fn teardown(&mut self) {
        let previous = self.shared.lock().phase.send_replace(FeedPhase::TornDown);
        if let Some(registration) = self.registration.take() {
            registration.remove();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if previous != FeedPhase::TornDown {
            tracing::debug!(status = %self.status, "task feed torn down");
        }
    }
}

impl Drop for RemoteTaskFeed {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drains listener events into the shared state until the listener ends,
/// fails, or the feed is torn down.
async fn pump_snapshots(
    status: TaskStatus,
    shared: Arc<Mutex<FeedShared>>,
    mut events: SnapshotReceiver,
) {
    while let Some(event) = events.recv().await {
        match event {
            Ok(snapshot) => {
                let tasks = decode_snapshot(status, &snapshot);
                let mut shared = shared.lock();
                if *shared.phase.borrow() == FeedPhase::TornDown {
                    return;
                }
                shared.snapshots += 1;
                shared.phase.send_if_modified(|phase| {
                    let first = *phase != FeedPhase::Live;
                    *phase = FeedPhase::Live;
                    first
                });
                tracing::trace!(%status, tasks = tasks.len(), "snapshot published");
                shared.tasks.send_replace(tasks);
            }
            Err(e) => {
                tracing::error!(%status, error = %e, "task listener failed");
                shared.lock().phase.send_if_modified(|phase| {
                    if *phase == FeedPhase::TornDown {
                        return false;
                    }
                    *phase = FeedPhase::Failed;
                    true
                });
                return;
            }
        }
    }
}

/// Decodes every document, skipping the ones that are not valid tasks.
fn decode_snapshot(status: TaskStatus, snapshot: &QuerySnapshot) -> Vec<Task> {
    snapshot
        .documents
        .iter()
        .filter_map(|doc| match Task::from_document(doc) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(%status, document_id = %doc.id, error = %e, "skipping undecodable task");
                None
            }
        })
        .collect()
}
