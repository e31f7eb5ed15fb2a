//! Error types for console operations.

use std::time::Duration;

use riziq_types::{Kind, Origin};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied: not an admin")]
    AuthorizationDenied,

    #[error("not signed in")]
    Unauthenticated,

    #[error("live subscription to `{collection}` failed: {reason}")]
    SubscriptionFailure { collection: String, reason: String },

    #[error("remote write rejected: {0}")]
    MutationRejected(String),

    #[error("malformed data in local slot `{key}`: {source}")]
    MalformedLocalData {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {0} no longer exists")]
    NotFound(String),

    #[error("local slot `{0}` has no free id left")]
    SlotFull(String),

    #[error("delete was not confirmed")]
    ConfirmationRequired,

    #[error("cannot change {kind} status: {reason}")]
    InvalidTransition { kind: Kind, reason: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("no {1} source for {0} records in this view")]
    NoSource(Kind, Origin),

    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Backend(Box::new(err))
    }
}
