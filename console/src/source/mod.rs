//! Backing-store interfaces and the adapters that turn them into record
//! sources.

mod local;
mod remote;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use riziq_types::{Document, Fields};
use tokio::task::JoinHandle;

use crate::Error;

pub use local::{LocalMutation, LocalStoreAdapter};
pub use remote::{RemoteCollectionAdapter, RemoteMutation};

/// Full ordered result sets of a live query, one per committed change.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Vec<Document>, Error>> + Send>>;

/// Slot keys written by other execution contexts.
pub type SlotChanges = Pin<Box<dyn Stream<Item = SlotChange> + Send>>;

/// A hosted document collection.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Starts a live query ordered by `order_by` descending.
    ///
    /// The stream yields the initial result set first, then a complete new
    /// result set after each change, in commit order.
    async fn watch(&self, order_by: &str) -> Result<SnapshotStream, Error>;

    async fn get(&self, id: &str) -> Result<Option<Document>, Error>;

    /// Stores a new document; the collection assigns its id and `createdAt`.
    async fn insert(&self, fields: Fields) -> Result<String, Error>;

    /// Merges `patch` into an existing document.
    async fn update(&self, id: &str, patch: Fields) -> Result<(), Error>;

    async fn delete(&self, id: &str) -> Result<(), Error>;
}

/// A change to a slot made by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    pub key: String,
}

/// String-keyed local storage shared by every context of one origin.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, Error>;

    async fn write(&self, key: &str, value: String) -> Result<(), Error>;

    /// Changes written through other handles of the same store.
    ///
    /// Writes made through this handle are not reported back to it.
    fn changes(&self) -> SlotChanges;
}

/// A standing callback registration; released on drop.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Whether the subscription can still deliver callbacks.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn release(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
