//! Remote document store abstraction.
//!
//! Defines the [`DocumentStore`] trait the board is written against.
//! The store owns persistence, query execution and realtime listening;
//! the board only subscribes to queries and issues writes.
//! Implementations:
//! - [`memory::MemoryStore`]: in-process store for tests and the CLI

pub mod memory;

use std::fmt;

use tokio::sync::mpsc;

use teamboard_proto::codec::CodecError;
use teamboard_proto::document::{Document, FieldMap};
use teamboard_proto::query::TaskQuery;

/// Errors reported by a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document with the given id exists.
    #[error("document {0} not found")]
    NotFound(String),

    /// A document with the given id already exists.
    #[error("document {0} already exists")]
    AlreadyExists(String),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An open listener was terminated by the store.
    #[error("listener failed: {0}")]
    ListenerFailed(String),

    /// Reading or writing persisted store data failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted store data could not be encoded or decoded.
    #[error("store codec error: {0}")]
    Codec(#[from] CodecError),
}

/// The complete result set of a query at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    /// Matching documents in query order.
    pub documents: Vec<Document>,
}

/// One delivery on a listener: a snapshot, or the error that ended it.
pub type SnapshotEvent = Result<QuerySnapshot, StoreError>;

/// Receiving side of a listener.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<SnapshotEvent>;

/// Handle to an open listener.
///
/// Calling [`remove`](Self::remove) or dropping the handle detaches the
/// listener synchronously; no snapshot is delivered afterwards.
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ListenerRegistration {
    /// Wraps the store-specific detach action.
    pub fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches the listener.
    pub fn remove(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Async document store the board reads from and writes to.
///
/// Ordering and filtering are the store's job: a listener receives each
/// result set already sorted by the query's clauses. Every write targets
/// one document; concurrency control is the store's per-document
/// last-write-wins.
pub trait DocumentStore: Send + Sync + 'static {
    /// Opens a realtime listener on `query`.
    ///
    /// Does not wait for data. The first snapshot, and one full result set
    /// per subsequent change, arrive on the returned receiver. A listener
    /// that fails delivers one `Err` and then goes quiet.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the listener cannot be established.
    fn subscribe(
        &self,
        query: &TaskQuery,
    ) -> Result<(ListenerRegistration, SnapshotReceiver), StoreError>;

    /// Creates a document, failing with [`StoreError::AlreadyExists`] if
    /// the id is taken.
    fn create(
        &self,
        document: Document,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Overwrites only the fields named in `fields`.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    fn update_fields(
        &self,
        id: &str,
        fields: FieldMap,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a document. Deleting a missing document succeeds.
    fn delete(&self, id: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
