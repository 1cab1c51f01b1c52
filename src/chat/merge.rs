use crate::common::{Message, Participant};

/// Concatenates both lists and stable-sorts by timestamp, so messages with
/// equal timestamps keep first-participant-then-second order.
pub fn merge_timelines(first: &[Message], second: &[Message]) -> Vec<Message> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    merged.extend_from_slice(first);
    merged.extend_from_slice(second);
    merged.sort_by_key(|message| message.timestamp);
    merged
}

/// Latest decoded list per participant. `None` until that side has delivered
/// its first snapshot.
#[derive(Debug, Default)]
pub struct TimelineReducer {
    first: Option<Vec<Message>>,
    second: Option<Vec<Message>>,
}

impl TimelineReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces one side and returns the recomputed merged list.
    pub fn apply(&mut self, participant: Participant, messages: Vec<Message>) -> Vec<Message> {
        match participant {
            Participant::First => self.first = Some(messages),
            Participant::Second => self.second = Some(messages),
        }
        self.merged()
    }

    /// Both sides have delivered at least once.
    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn merged(&self) -> Vec<Message> {
        merge_timelines(
            self.first.as_deref().unwrap_or_default(),
            self.second.as_deref().unwrap_or_default(),
        )
    }
}
