use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use super::watchers::Watchers;
use super::{DocPath, Document, DocumentStore, Snapshot, StoreError, Subscription, merge_fields};

struct Inner {
    conn: Connection,
    watchers: Watchers,
}

/// Store that keeps documents as JSON rows in SQLite.
pub struct SqliteStore {
    inner: Mutex<Inner>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let store = Self::with_connection(Connection::open(path)?)?;
        log::info!("Opened SQLite document store at {}", path.display());
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                watchers: Watchers::default(),
            }),
        })
    }

    fn load(conn: &Connection, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE path = ?1",
                params![path.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some(raw) => match serde_json::from_str::<Value>(&raw)? {
                Value::Object(document) => Ok(Some(document)),
                _ => Err(StoreError::NotAnObject(path.to_string())),
            },
        }
    }

    #[cfg(test)]
    fn count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.lock()?;
        let count: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn merge_write(&self, path: &DocPath, fields: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        let mut document = Self::load(&inner.conn, path)?.unwrap_or_default();
        merge_fields(&mut document, fields);

        let encoded = serde_json::to_string(&document)?;
        inner.conn.execute(
            "INSERT INTO documents (path, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![path.as_str(), encoded, Utc::now().timestamp_millis()],
        )?;

        inner
            .watchers
            .publish(Snapshot::new(path.clone(), Some(document)));
        Ok(())
    }

    async fn get(&self, path: &DocPath) -> Result<Snapshot, StoreError> {
        let inner = self.inner.lock()?;
        Ok(Snapshot::new(path.clone(), Self::load(&inner.conn, path)?))
    }

    fn subscribe(&self, path: &DocPath) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock()?;
        let current = Snapshot::new(path.clone(), Self::load(&inner.conn, path)?);
        Ok(inner.watchers.subscribe(current))
    }
}
