use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid document path `{0}`")]
    InvalidPath(String),
    #[error("document at `{0}` is not a JSON object")]
    NotAnObject(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}
