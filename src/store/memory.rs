use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::watchers::Watchers;
use super::{DocPath, Document, DocumentStore, Snapshot, StoreError, Subscription, merge_fields};

#[derive(Default)]
struct Inner {
    documents: HashMap<DocPath, Document>,
    watchers: Watchers,
}

/// Store that keeps every document in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.watchers.len()).unwrap_or(0)
    }

    fn snapshot(inner: &Inner, path: &DocPath) -> Snapshot {
        Snapshot::new(path.clone(), inner.documents.get(path).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn merge_write(&self, path: &DocPath, fields: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        merge_fields(inner.documents.entry(path.clone()).or_default(), fields);
        let snapshot = Self::snapshot(&inner, path);
        inner.watchers.publish(snapshot);
        Ok(())
    }

    async fn get(&self, path: &DocPath) -> Result<Snapshot, StoreError> {
        let inner = self.inner.lock()?;
        Ok(Self::snapshot(&inner, path))
    }

    fn subscribe(&self, path: &DocPath) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock()?;
        let current = Self::snapshot(&inner, path);
        Ok(inner.watchers.subscribe(current))
    }
}
