//! Error types for the terminal console.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Console(#[from] riziq_console::Error),

    #[error(transparent)]
    Store(#[from] riziq_store::Error),

    #[error("invalid {key} value {value:?}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),

    #[error("no row {0} in the table")]
    NoSuchRow(usize),
}
