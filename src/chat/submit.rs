use chrono::Utc;
use tokio::task::JoinHandle;

use crate::common::UserId;
use crate::store::{DocPath, SharedStore, StoreError};

use super::codec::encode_message;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Writes chat messages into their sender's user document.
#[derive(Clone)]
pub struct Submitter {
    store: SharedStore,
}

impl Submitter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Fire-and-forget write of `text` under the current millisecond.
    ///
    /// Failures are logged and otherwise dropped. Two submissions from the
    /// same user within one millisecond share a key, so the later one wins.
    pub fn submit(&self, user: UserId, text: String) -> JoinHandle<()> {
        let submitter = self.clone();
        let timestamp = now_millis();
        tokio::spawn(async move {
            if let Err(err) = submitter.write_message(&user, timestamp, &text).await {
                log::warn!("Dropped message from {user} at {timestamp}: {err}");
            }
        })
    }

    /// Merges one `timestamp -> text` entry into `users/{user}`.
    pub async fn write_message(
        &self,
        user: &UserId,
        timestamp: i64,
        text: &str,
    ) -> Result<(), StoreError> {
        let path = DocPath::user(user)?;
        self.store
            .merge_write(&path, encode_message(timestamp, text))
            .await?;
        log::debug!("Stored message {timestamp} for {user}");
        Ok(())
    }
}
