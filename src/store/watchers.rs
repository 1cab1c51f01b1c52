use std::collections::HashMap;

use tokio::sync::watch;

use super::{DocPath, Snapshot, Subscription};

/// Per-document fan-out of snapshots. Callers hold the store lock around
/// every call so publication order matches write order.
#[derive(Default)]
pub(crate) struct Watchers {
    senders: HashMap<DocPath, watch::Sender<Snapshot>>,
}

impl Watchers {
    pub fn subscribe(&mut self, current: Snapshot) -> Subscription {
        self.senders.retain(|_, sender| sender.receiver_count() > 0);

        let path = current.path().clone();
        let receiver = match self.senders.get(&path) {
            Some(sender) => {
                sender.send_if_modified(|previous| {
                    if *previous == current {
                        return false;
                    }
                    *previous = current;
                    true
                });
                sender.subscribe()
            }
            None => {
                let (sender, receiver) = watch::channel(current);
                self.senders.insert(path, sender);
                receiver
            }
        };
        Subscription::new(receiver)
    }

    pub fn publish(&mut self, snapshot: Snapshot) {
        let path = snapshot.path().clone();
        let Some(sender) = self.senders.get(&path) else {
            return;
        };
        if sender.send(snapshot).is_err() {
            log::debug!("No subscribers left for {path}; dropping watcher");
            self.senders.remove(&path);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.senders.len()
    }
}
