use crate::common::types::UserId;

/// Commands the UI sends down to the chat service.
#[derive(Debug, Clone)]
pub enum ChatCommand {
    /// Write `text` into the sender's document under the current timestamp.
    Submit { user: UserId, text: String },
}
