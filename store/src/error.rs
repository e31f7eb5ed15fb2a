//! Error types for the SQLite store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document {0} not found")]
    NotFound(String),

    #[error("no user with email {0}")]
    UserNotFound(String),
}

impl From<Error> for riziq_console::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(id) => riziq_console::Error::NotFound(id),
            other => riziq_console::Error::backend(other),
        }
    }
}
