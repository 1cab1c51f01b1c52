use std::fmt;

use uuid::Uuid;

/// Identifier of a chat participant, used as the key of their user document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single chat line as decoded from a user document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub user: UserId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    First,
    Second,
}

/// The two identities of one run. Generated at startup and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub first: UserId,
    pub second: UserId,
}

impl Session {
    pub fn new(first: UserId, second: UserId) -> Self {
        Self { first, second }
    }

    pub fn generate() -> Self {
        Self::new(UserId::generate(), UserId::generate())
    }

    pub fn user(&self, participant: Participant) -> &UserId {
        match participant {
            Participant::First => &self.first,
            Participant::Second => &self.second,
        }
    }
}
