pub mod commands;
pub mod types;

pub use commands::ChatCommand;
pub use types::{Message, Participant, Session, UserId};
