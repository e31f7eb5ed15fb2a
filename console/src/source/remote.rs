//! Live source over a remote document collection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use riziq_types::{Document, Fields, RawItem};
use tracing::{debug, warn};

use super::{DocumentCollection, SubscriptionHandle};
use crate::Error;

/// Field every remote collection is ordered by.
pub const ORDER_FIELD: &str = "createdAt";

#[derive(Debug, Clone)]
pub enum RemoteMutation {
    Patch(Fields),
    Delete,
}

#[derive(Clone)]
pub struct RemoteCollectionAdapter {
    collection: Arc<dyn DocumentCollection>,
    timeout: Duration,
}

impl RemoteCollectionAdapter {
    pub fn new(collection: Arc<dyn DocumentCollection>, timeout: Duration) -> Self {
        Self {
            collection,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Registers `on_change` for every snapshot, starting with the current one.
    ///
    /// If the live query cannot be attached, fails midway or ends, `on_error`
    /// is called once and no further snapshots are delivered. There is no
    /// retry; the caller decides what to do.
    pub fn subscribe<F, E>(&self, mut on_change: F, on_error: E) -> SubscriptionHandle
    where
        F: FnMut(Vec<RawItem>) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let collection = Arc::clone(&self.collection);
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let name = collection.name().to_string();
            let failure = match within(timeout, collection.watch(ORDER_FIELD)).await {
                Ok(mut stream) => loop {
                    match stream.next().await {
                        Some(Ok(documents)) => {
                            debug!(collection = %name, count = documents.len(), "snapshot received");
                            on_change(documents.into_iter().map(RawItem::remote).collect());
                        }
                        Some(Err(e)) => break e.to_string(),
                        None => break "live query closed".to_string(),
                    }
                },
                Err(e) => e.to_string(),
            };

            warn!(collection = %name, reason = %failure, "live subscription failed");
            on_error(Error::SubscriptionFailure {
                collection: name,
                reason: failure,
            });
        });

        SubscriptionHandle::new(task)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, Error> {
        within(self.timeout, self.collection.get(id)).await
    }

    pub async fn insert(&self, fields: Fields) -> Result<String, Error> {
        within(self.timeout, self.collection.insert(fields)).await
    }

    pub async fn mutate(&self, id: &str, mutation: RemoteMutation) -> Result<(), Error> {
        match mutation {
            RemoteMutation::Patch(patch) => {
                within(self.timeout, self.collection.update(id, patch)).await
            }
            RemoteMutation::Delete => within(self.timeout, self.collection.delete(id)).await,
        }
    }
}

async fn within<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| Error::Timeout(limit))?
}
