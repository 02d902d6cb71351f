//! In-process document store.
//!
//! [`MemoryStore`] keeps documents in a shared map behind a
//! [`parking_lot::Mutex`] and re-evaluates every open listener's query after
//! each write, delivering a fresh full result set whenever it changed.
//! Cloning the store yields another handle to the same data.
//!
//! Besides the [`DocumentStore`] contract it records every write attempt,
//! can be told to fail writes, subscriptions or listeners, and can persist
//! its documents to disk through the snapshot codec. The write log keeps the
//! most recent [`WRITE_LOG_CAPACITY`] attempts.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use teamboard_proto::codec;
use teamboard_proto::document::{Document, FieldMap, SNAPSHOT_VERSION, StoreSnapshot};
use teamboard_proto::query::TaskQuery;

use super::{DocumentStore, ListenerRegistration, QuerySnapshot, SnapshotReceiver, StoreError};

/// Number of write attempts kept by [`MemoryStore::write_log`].
pub const WRITE_LOG_CAPACITY: usize = 1024;

/// A write attempt as seen by the store, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRecord {
    /// `create` of a whole document.
    Create {
        /// Document id.
        id: String,
    },
    /// `update_fields` with the exact field map received.
    Update {
        /// Document id.
        id: String,
        /// Fields the caller asked to overwrite.
        fields: FieldMap,
    },
    /// `delete` of a document.
    Delete {
        /// Document id.
        id: String,
    },
}

struct Listener {
    query: TaskQuery,
    last: Vec<Document>,
    tx: mpsc::UnboundedSender<Result<QuerySnapshot, StoreError>>,
}

#[derive(Default)]
struct Inner {
    documents: BTreeMap<String, Document>,
    listeners: HashMap<u64, Listener>,
    next_listener_id: u64,
    write_log: VecDeque<WriteRecord>,
    failing_writes: usize,
    failing_subscribes: usize,
    failing_listeners: usize,
}

impl Inner {
    fn record(&mut self, record: WriteRecord) {
        if self.write_log.len() == WRITE_LOG_CAPACITY {
            self.write_log.pop_front();
        }
        self.write_log.push_back(record);
    }

    /// Consumes one injected failure, if any are pending.
    fn take_failure(&mut self) -> Option<StoreError> {
        if self.failing_writes == 0 {
            return None;
        }
        self.failing_writes -= 1;
        Some(StoreError::Unavailable("injected write failure".to_string()))
    }

    /// Pushes a new result set to every listener whose result changed.
    fn notify_listeners(&mut self) {
        let documents = &self.documents;
        self.listeners.retain(|id, listener| {
            let result = listener.query.evaluate(documents.values());
            if result == listener.last {
                return true;
            }
            let snapshot = QuerySnapshot {
                documents: result.clone(),
            };
            if listener.tx.send(Ok(snapshot)).is_err() {
                tracing::debug!(listener = id, "listener receiver dropped, detaching");
                return false;
            }
            listener.last = result;
            true
        });
    }
}

/// Shared in-memory document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the documents of `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let documents = snapshot
            .documents
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                documents,
                ..Inner::default()
            })),
        }
    }

    /// Returns every document, in id order.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            documents: self.inner.lock().documents.values().cloned().collect(),
        }
    }

    /// Loads a store persisted with [`save`](Self::save).
    ///
    /// A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Codec`] if its contents cannot be decoded.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let snapshot = codec::decode(&bytes)?;
                tracing::debug!(
                    path = %path.display(),
                    documents = snapshot.documents.len(),
                    "loaded store"
                );
                Ok(Self::from_snapshot(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Persists every document to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Codec`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = codec::encode(&self.snapshot())?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        tracing::debug!(path = %path.display(), "saved store");
        Ok(())
    }

    /// Inserts or replaces documents directly, bypassing the write log and
    /// failure injection. Listeners are notified.
    pub fn seed(&self, documents: impl IntoIterator<Item = Document>) {
        let mut inner = self.inner.lock();
        for doc in documents {
            inner.documents.insert(doc.id.clone(), doc);
        }
        inner.notify_listeners();
    }

    /// Returns a copy of one document.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<Document> {
        self.inner.lock().documents.get(id).cloned()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().documents.len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().documents.is_empty()
    }

    /// Number of currently attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Recent write attempts, oldest first.
    #[must_use]
    pub fn write_log(&self) -> Vec<WriteRecord> {
        self.inner.lock().write_log.iter().cloned().collect()
    }

    /// Makes the next `count` writes fail with [`StoreError::Unavailable`].
    pub fn fail_next_writes(&self, count: usize) {
        self.inner.lock().failing_writes = count;
    }

    /// Makes the next `count` calls to `subscribe` fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_next_subscribes(&self, count: usize) {
        self.inner.lock().failing_subscribes = count;
    }

    /// Makes the next `count` listeners fail with
    /// [`StoreError::ListenerFailed`] before delivering any snapshot.
    pub fn fail_next_listeners(&self, count: usize) {
        self.inner.lock().failing_listeners = count;
    }

    /// Terminates every open listener with [`StoreError::ListenerFailed`].
    pub fn break_listeners(&self, reason: &str) {
        let mut inner = self.inner.lock();
        for (id, listener) in inner.listeners.drain() {
            tracing::debug!(listener = id, reason, "terminating listener");
            let _ = listener
                .tx
                .send(Err(StoreError::ListenerFailed(reason.to_string())));
        }
    }

    fn create_now(&self, document: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.record(WriteRecord::Create {
            id: document.id.clone(),
        });
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        if inner.documents.contains_key(&document.id) {
            return Err(StoreError::AlreadyExists(document.id));
        }
        inner.documents.insert(document.id.clone(), document);
        inner.notify_listeners();
        Ok(())
    }

    fn update_now(&self, id: &str, fields: FieldMap) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.record(WriteRecord::Update {
            id: id.to_string(),
            fields: fields.clone(),
        });
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        let doc = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.merge_fields(&fields);
        inner.notify_listeners();
        Ok(())
    }

    fn delete_now(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.record(WriteRecord::Delete { id: id.to_string() });
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }
        if inner.documents.remove(id).is_some() {
            inner.notify_listeners();
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe(
        &self,
        query: &TaskQuery,
    ) -> Result<(ListenerRegistration, SnapshotReceiver), StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener_id = {
            let mut inner = self.inner.lock();
            if inner.failing_subscribes > 0 {
                inner.failing_subscribes -= 1;
                return Err(StoreError::Unavailable(
                    "injected subscribe failure".to_string(),
                ));
            }
            if inner.failing_listeners > 0 {
                inner.failing_listeners -= 1;
                let _ = tx.send(Err(StoreError::ListenerFailed(
                    "injected listener failure".to_string(),
                )));
                return Ok((ListenerRegistration::new(|| {}), rx));
            }
            let listener_id = inner.next_listener_id;
            inner.next_listener_id += 1;

            let initial = query.evaluate(inner.documents.values());
            // The receiver is still in hand, so this send cannot fail.
            let _ = tx.send(Ok(QuerySnapshot {
                documents: initial.clone(),
            }));
            inner.listeners.insert(
                listener_id,
                Listener {
                    query: query.clone(),
                    last: initial,
                    tx,
                },
            );
            listener_id
        };
        tracing::debug!(listener = listener_id, "listener attached");

        let weak = Arc::downgrade(&self.inner);
        let registration = ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.remove(&listener_id);
                tracing::debug!(listener = listener_id, "listener detached");
            }
        });
        Ok((registration, rx))
    }

    async fn create(&self, document: Document) -> Result<(), StoreError> {
        // Complete on a later poll, like a network round trip would.
        tokio::task::yield_now().await;
        self.create_now(document)
    }

    async fn update_fields(&self, id: &str, fields: FieldMap) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.update_now(id, fields)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.delete_now(id)
    }
}
