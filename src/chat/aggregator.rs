//! Joins the two participants' document feeds into one ordered transcript.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::common::{Message, Participant, Session, UserId};
use crate::store::{DocPath, DocumentStore, StoreError, Subscription};

use super::codec::decode_messages;
use super::merge::TimelineReducer;

/// Merged transcript as last published.
#[derive(Debug, Clone, Default)]
pub struct TranscriptView {
    messages: Option<Arc<[Message]>>,
    complete: bool,
}

impl TranscriptView {
    /// `None` until either side has delivered its first snapshot.
    pub fn messages(&self) -> Option<&Arc<[Message]>> {
        self.messages.as_ref()
    }

    /// Both participants have delivered at least one snapshot.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Handle to a running aggregation task.
///
/// Owns the task and, through it, both subscriptions. [`Transcript::close`]
/// or dropping the handle stops the task and unsubscribes.
pub struct Transcript {
    updates: watch::Receiver<TranscriptView>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Transcript {
    pub fn spawn(store: &dyn DocumentStore, session: &Session) -> Result<Self, StoreError> {
        let first = store.subscribe(&DocPath::user(&session.first)?)?;
        let second = store.subscribe(&DocPath::user(&session.second)?)?;

        let (publisher, updates) = watch::channel(TranscriptView::default());
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(session.clone(), first, second, publisher, shutdown_rx));

        log::info!(
            "Transcript started for {} and {}",
            session.first,
            session.second
        );

        Ok(Self {
            updates,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    pub fn latest(&self) -> TranscriptView {
        self.updates.borrow().clone()
    }

    /// Receiver side of the derived stream, for consumers that want to wait
    /// on changes themselves.
    pub fn updates(&self) -> watch::Receiver<TranscriptView> {
        self.updates.clone()
    }

    /// Waits until both participants have delivered a snapshot and returns
    /// the merged list at that point. `None` if the task ends first.
    pub async fn loaded(&self) -> Option<Arc<[Message]>> {
        let mut updates = self.updates.clone();
        let view = updates.wait_for(TranscriptView::is_complete).await.ok()?;
        view.messages.clone()
    }

    pub async fn close(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::warn!("Transcript task ended abnormally: {err}");
            }
        }
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for Transcript {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    session: Session,
    mut first: Subscription,
    mut second: Subscription,
    publisher: watch::Sender<TranscriptView>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut reducer = TimelineReducer::new();
    let mut first_open = true;
    let mut second_open = true;

    while first_open || second_open {
        let (participant, snapshot) = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            snapshot = first.next(), if first_open => (Participant::First, snapshot),
            snapshot = second.next(), if second_open => (Participant::Second, snapshot),
        };

        let Some(snapshot) = snapshot else {
            log::debug!("{participant:?} participant feed closed");
            match participant {
                Participant::First => first_open = false,
                Participant::Second => second_open = false,
            }
            continue;
        };

        let user: &UserId = session.user(participant);
        let messages = decode_messages(user, snapshot.data());
        let merged = reducer.apply(participant, messages);
        publisher.send_replace(TranscriptView {
            messages: Some(merged.into()),
            complete: reducer.is_complete(),
        });
    }

    // unsubscribe before the publisher closes
    drop(first);
    drop(second);
    log::info!("Transcript for {} and {} stopped", session.first, session.second);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::chat::submit::Submitter;
    use crate::store::MemoryStore;

    async fn wait_for_len(transcript: &Transcript, len: usize) -> Arc<[Message]> {
        let mut updates = transcript.updates();
        let view = timeout(
            Duration::from_secs(2),
            updates.wait_for(|view| view.messages().is_some_and(|list| list.len() == len)),
        )
        .await
        .expect("transcript did not reach expected length")
        .expect("transcript task ended")
        .clone();
        view.messages().unwrap().clone()
    }

    #[tokio::test]
    async fn empty_documents_load_as_empty_transcript() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new("A".into(), "B".into());
        let transcript = Transcript::spawn(&*store, &session).unwrap();

        let view = wait_for_len(&transcript, 0).await;
        assert!(view.is_empty());
        transcript.close().await;
    }

    #[tokio::test]
    async fn merges_both_participants_in_time_order() {
        let store = Arc::new(MemoryStore::new());
        let submitter = Submitter::new(store.clone());
        let session = Session::new("A".into(), "B".into());

        submitter.write_message(&session.first, 10, "a1").await.unwrap();
        submitter.write_message(&session.second, 5, "b0").await.unwrap();

        let transcript = Transcript::spawn(&*store, &session).unwrap();
        wait_for_len(&transcript, 2).await;

        submitter.write_message(&session.first, 20, "a2").await.unwrap();
        submitter.write_message(&session.second, 15, "b1").await.unwrap();

        let view = wait_for_len(&transcript, 4).await;
        let texts: Vec<&str> = view.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["b0", "a1", "b1", "a2"]);
        assert_eq!(view[0].user, session.second);

        transcript.close().await;
    }

    #[tokio::test]
    async fn other_documents_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let submitter = Submitter::new(store.clone());
        let session = Session::new("A".into(), "B".into());
        let transcript = Transcript::spawn(&*store, &session).unwrap();

        submitter.write_message(&"C".into(), 1, "stranger").await.unwrap();
        submitter.write_message(&session.second, 2, "b").await.unwrap();

        let view = wait_for_len(&transcript, 1).await;
        assert_eq!(view[0].text, "b");
        transcript.close().await;
    }

    #[tokio::test]
    async fn close_stops_the_task() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new("A".into(), "B".into());
        let transcript = Transcript::spawn(&*store, &session).unwrap();
        let mut updates = transcript.updates();

        timeout(Duration::from_secs(1), transcript.close())
            .await
            .unwrap();

        // drain anything published before shutdown; the sender is gone after
        let drained = timeout(Duration::from_secs(1), async {
            while updates.changed().await.is_ok() {}
        })
        .await;
        assert!(drained.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn loaded_waits_for_both_participants() {
        for _ in 0..100 {
            let store = Arc::new(MemoryStore::new());
            let submitter = Submitter::new(store.clone());
            let session = Session::new("A".into(), "B".into());
            submitter.write_message(&session.first, 1, "a").await.unwrap();
            submitter.write_message(&session.second, 2, "b").await.unwrap();

            let transcript = Transcript::spawn(&*store, &session).unwrap();
            let messages = timeout(Duration::from_secs(2), transcript.loaded())
                .await
                .unwrap()
                .unwrap();

            let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
            assert_eq!(texts, vec!["a", "b"]);
            assert!(transcript.latest().is_complete());
            transcript.close().await;
        }
    }

    #[tokio::test]
    async fn dropping_the_handle_unsubscribes() {
        let store = Arc::new(MemoryStore::new());
        let submitter = Submitter::new(store.clone());
        let session = Session::new("A".into(), "B".into());
        let transcript = Transcript::spawn(&*store, &session).unwrap();
        let mut updates = transcript.updates();
        assert_eq!(store.watcher_count(), 2);

        drop(transcript);

        let drained = timeout(Duration::from_secs(1), async {
            while updates.changed().await.is_ok() {}
        })
        .await;
        assert!(drained.is_ok());

        submitter.write_message(&session.first, 1, "a").await.unwrap();
        submitter.write_message(&session.second, 2, "b").await.unwrap();
        assert_eq!(store.watcher_count(), 0);
    }
}
