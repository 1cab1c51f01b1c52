//! Real-time document store.
//!
//! Documents are JSON objects addressed by `collection/id` paths. Writers
//! merge partial documents in; readers subscribe and receive the current
//! snapshot followed by every later change.

pub mod error;
pub mod memory;
pub mod sqlite;
mod watchers;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::common::UserId;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type Document = Map<String, Value>;

/// Address of a document, e.g. `users/4f1c...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|segment| segment.is_empty()) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(Self(path.to_string()))
    }

    pub fn user(user: &UserId) -> Result<Self, StoreError> {
        Self::parse(&format!("users/{user}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time copy of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: DocPath,
    data: Option<Arc<Document>>,
}

impl Snapshot {
    pub fn new(path: DocPath, data: Option<Document>) -> Self {
        Self {
            path,
            data: data.map(Arc::new),
        }
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// `None` when the document does not exist.
    pub fn data(&self) -> Option<&Document> {
        self.data.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

/// Live feed of snapshots for one document.
///
/// The first call to [`Subscription::next`] yields the snapshot current at
/// subscription time; later calls wait for the next change. Intermediate
/// snapshots may be skipped when the reader falls behind. Dropping the handle
/// unsubscribes.
pub struct Subscription {
    receiver: watch::Receiver<Snapshot>,
    primed: bool,
}

impl Subscription {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        Self {
            receiver,
            primed: false,
        }
    }

    /// Returns `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.primed {
            self.receiver.changed().await.ok()?;
        }
        self.primed = true;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn into_stream(self) -> impl Stream<Item = Snapshot> + Send + Unpin {
        Box::pin(futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|snapshot| (snapshot, subscription))
        }))
    }

    pub fn cancel(self) {
        log::debug!("Subscription to {} cancelled", self.receiver.borrow().path());
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Deep-merges `fields` into the document at `path`, creating it when
    /// absent, and notifies subscribers.
    async fn merge_write(&self, path: &DocPath, fields: Document) -> Result<(), StoreError>;

    async fn get(&self, path: &DocPath) -> Result<Snapshot, StoreError>;

    fn subscribe(&self, path: &DocPath) -> Result<Subscription, StoreError>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Opens the SQLite store at `database_path`, or an in-memory store.
pub fn open_store(database_path: Option<&str>) -> Result<SharedStore, StoreError> {
    match database_path {
        Some(path) => Ok(Arc::new(SqliteStore::open(path)?)),
        None => {
            log::info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Recursively merges `patch` into `target`. Nested objects are merged key by
/// key; any other value replaces what was there.
pub fn merge_fields(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_fields(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
