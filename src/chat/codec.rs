//! Mapping between user documents and [`Message`] records.
//!
//! A user document looks like `{ "messages": { "<timestamp ms>": "<text>" } }`.

use serde_json::{Map, Value};

use crate::common::{Message, UserId};
use crate::store::Document;

pub const MESSAGES_FIELD: &str = "messages";

/// Partial document adding one message; meant for a merge write.
pub fn encode_message(timestamp: i64, text: &str) -> Document {
    let mut messages = Map::new();
    messages.insert(timestamp.to_string(), Value::String(text.to_string()));

    let mut document = Map::new();
    document.insert(MESSAGES_FIELD.to_string(), Value::Object(messages));
    document
}

/// Decodes every message in `document`, attributing them to `user`.
///
/// A missing document, or one without a `messages` object, yields no
/// messages. Entries with a non-integer key or non-string text are skipped.
/// Output order follows the document's key order, not timestamps.
pub fn decode_messages(user: &UserId, document: Option<&Document>) -> Vec<Message> {
    let Some(Value::Object(messages)) = document.and_then(|doc| doc.get(MESSAGES_FIELD)) else {
        return Vec::new();
    };

    messages
        .iter()
        .filter_map(|(key, value)| {
            let timestamp = match key.parse::<i64>() {
                Ok(timestamp) => timestamp,
                Err(err) => {
                    log::debug!("Skipping message key `{key}` for {user}: {err}");
                    return None;
                }
            };
            let Value::String(text) = value else {
                log::debug!("Skipping non-text message {key} for {user}");
                return None;
            };
            Some(Message {
                user: user.clone(),
                timestamp,
                text: text.clone(),
            })
        })
        .collect()
}
