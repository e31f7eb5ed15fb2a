//! Source over a local slot holding a JSON array of items.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use riziq_types::{id_string, Fields, Kind, RawItem};
use serde_json::Value;
use tracing::{debug, warn};

use super::{SlotStore, SubscriptionHandle};
use crate::Error;

#[derive(Debug, Clone)]
pub enum LocalMutation {
    Patch { id: String, fields: Fields },
    Delete { id: String },
    Insert(Fields),
}

#[derive(Clone)]
pub struct LocalStoreAdapter {
    store: Arc<dyn SlotStore>,
    kind: Kind,
}

impl LocalStoreAdapter {
    pub fn new(store: Arc<dyn SlotStore>, kind: Kind) -> Self {
        Self { store, kind }
    }

    pub fn key(&self) -> &'static str {
        self.kind.slot_key()
    }

    /// Reads the slot. Never fails: an unreadable or corrupt slot is empty.
    ///
    /// Only the first item with a given id is kept.
    pub async fn fetch_once(&self) -> Vec<RawItem> {
        let items = match self.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!(slot = self.key(), error = %e, "treating local slot as empty");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter_map(RawItem::local)
            .filter(|item| {
                let first = seen.insert(item.id.clone());
                if !first {
                    warn!(slot = self.key(), id = %item.id, "skipping duplicate local id");
                }
                first
            })
            .collect()
    }

    /// Applies `mutation` with a read-transform-write of the whole slot.
    ///
    /// Returns the id of the affected item. Patching or deleting an id the
    /// slot does not hold is [`Error::NotFound`] and writes nothing.
    pub async fn mutate(&self, mutation: LocalMutation) -> Result<String, Error> {
        match mutation {
            LocalMutation::Patch { id, fields } => {
                self.update_with(&id, move |item| {
                    item.extend(fields);
                    Ok(())
                })
                .await?;
                Ok(id)
            }
            LocalMutation::Delete { id } => {
                let mut items = self.load_or_empty().await?;
                let position = position_of(&items, &id).ok_or_else(|| Error::NotFound(id.clone()))?;
                items.remove(position);
                self.save(items).await?;
                Ok(id)
            }
            LocalMutation::Insert(mut fields) => {
                let mut items = self.load_or_empty().await?;
                let id = fresh_id(&items).ok_or_else(|| Error::SlotFull(self.key().to_string()))?;
                fields.insert("id".to_string(), Value::from(id));
                fields
                    .entry("createdAt")
                    .or_insert_with(|| Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)));
                items.push(Value::Object(fields));
                self.save(items).await?;
                Ok(id.to_string())
            }
        }
    }

    /// Rewrites the item `id` in place with `edit`, returning its new fields.
    ///
    /// The item is read from the store, not from any cached view, so two
    /// edits issued back to back always see each other.
    pub async fn update_with<F>(&self, id: &str, edit: F) -> Result<Fields, Error>
    where
        F: FnOnce(&mut Fields) -> Result<(), Error>,
    {
        let mut items = self.load_or_empty().await?;
        let item = position_of(&items, id)
            .and_then(|position| items[position].as_object_mut())
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        edit(item)?;
        let updated = item.clone();
        self.save(items).await?;
        Ok(updated)
    }

    /// Calls `on_change` whenever another context rewrites this slot.
    pub fn watch<F>(&self, mut on_change: F) -> SubscriptionHandle
    where
        F: FnMut() + Send + 'static,
    {
        let mut changes = self.store.changes();
        let key = self.key();
        let task = tokio::spawn(async move {
            while let Some(change) = changes.next().await {
                if change.key == key {
                    debug!(slot = key, "slot changed in another context");
                    on_change();
                }
            }
        });
        SubscriptionHandle::new(task)
    }

    async fn load(&self) -> Result<Vec<Value>, Error> {
        let Some(raw) = self.store.read(self.key()).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| Error::MalformedLocalData {
            key: self.key().to_string(),
            source,
        })
    }

    /// Like `load`, but a corrupt slot is overwritten rather than kept.
    async fn load_or_empty(&self) -> Result<Vec<Value>, Error> {
        match self.load().await {
            Err(Error::MalformedLocalData { key, source }) => {
                warn!(slot = %key, error = %source, "discarding malformed local data");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn save(&self, items: Vec<Value>) -> Result<(), Error> {
        let encoded = serde_json::to_string(&items).map_err(Error::backend)?;
        self.store.write(self.key(), encoded).await
    }
}

fn item_id(item: &Value) -> Option<String> {
    item.as_object()?.get("id").and_then(id_string)
}

/// Index of the first item with `id`, the one `fetch_once` keeps.
fn position_of(items: &[Value], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item_id(item).as_deref() == Some(id))
}

/// Epoch millis, bumped past any numeric id already in the slot.
///
/// When the highest id is `u64::MAX` the first free value from now on,
/// wrapping around, is used instead.
fn fresh_id(items: &[Value]) -> Option<u64> {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let taken: HashSet<u64> = items
        .iter()
        .filter_map(|item| item_id(item)?.parse().ok())
        .collect();

    match taken.iter().max() {
        Some(&highest) if highest >= now => highest
            .checked_add(1)
            .or_else(|| (now..=u64::MAX).chain(0..now).find(|id| !taken.contains(id))),
        _ => Some(now),
    }
}
