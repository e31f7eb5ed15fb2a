//! Wires source adapters to a view's event queue.
//!
//! Subscription callbacks never touch view state directly: they only post a
//! [`SourceEvent`], which the controller applies on its own task.

use riziq_types::RawItem;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::source::{LocalStoreAdapter, RemoteCollectionAdapter, SubscriptionHandle};
use crate::Error;

#[derive(Debug)]
pub(crate) enum SourceEvent {
    /// A complete new result set for the source at `source`.
    Snapshot { source: usize, items: Vec<RawItem> },
    /// The source's live query failed; it will not deliver again.
    Failed { source: usize, error: Error },
    /// Another context rewrote the source's local slot.
    SlotChanged { source: usize },
}

/// Live registrations of one view, released together.
#[derive(Default)]
pub(crate) struct Subscriptions {
    handles: Vec<SubscriptionHandle>,
}

impl Subscriptions {
    pub fn attach_remote(
        &mut self,
        source: usize,
        adapter: &RemoteCollectionAdapter,
        events: UnboundedSender<SourceEvent>,
    ) {
        let snapshots = events.clone();
        let handle = adapter.subscribe(
            move |items| {
                let _ = snapshots.send(SourceEvent::Snapshot { source, items });
            },
            move |error| {
                let _ = events.send(SourceEvent::Failed { source, error });
            },
        );
        self.handles.push(handle);
    }

    pub fn attach_local(
        &mut self,
        source: usize,
        adapter: &LocalStoreAdapter,
        events: UnboundedSender<SourceEvent>,
    ) {
        let handle = adapter.watch(move || {
            let _ = events.send(SourceEvent::SlotChanged { source });
        });
        self.handles.push(handle);
    }

    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| h.is_active()).count()
    }

    pub fn release_all(&mut self) {
        debug!(count = self.handles.len(), "releasing subscriptions");
        self.handles.drain(..).for_each(SubscriptionHandle::release);
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release_all();
    }
}
