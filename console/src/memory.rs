//! In-process implementations of the collaborator interfaces.
//!
//! They back the tests and any embedding that does not need persistence.
//! [`MemoryCollection`] can also be told to refuse writes or live queries,
//! which is how failure handling is exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use riziq_types::{Document, Fields};
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

use crate::auth::{IdToken, IdentityProvider, User};
use crate::normalize::instant;
use crate::source::{DocumentCollection, SlotChange, SlotChanges, SlotStore, SnapshotStream};
use crate::Error;

const CHANGE_CAPACITY: usize = 64;

/// A document collection held in memory.
pub struct MemoryCollection {
    name: String,
    documents: watch::Sender<Vec<Document>>,
    next_id: AtomicU64,
    reject_writes: AtomicBool,
    deny_watch: AtomicBool,
    watch_calls: AtomicUsize,
    get_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        let (documents, _) = watch::channel(Vec::new());
        Self {
            name: name.into(),
            documents,
            next_id: AtomicU64::new(1),
            reject_writes: AtomicBool::new(false),
            deny_watch: AtomicBool::new(false),
            watch_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Makes every insert, update and delete fail as a permission error.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Makes new live queries fail as a permission error.
    pub fn deny_watch(&self, deny: bool) {
        self.deny_watch.store(deny, Ordering::SeqCst);
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Live queries still attached.
    pub fn watchers(&self) -> usize {
        self.documents.receiver_count()
    }

    /// Stores a document under a caller-chosen id, as the public site does.
    pub fn put(&self, id: impl Into<String>, fields: Fields) {
        let document = Document::new(id, fields);
        self.documents.send_modify(|documents| {
            documents.retain(|d| d.id != document.id);
            documents.push(document);
        });
    }

    fn check_writable(&self) -> Result<(), Error> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(Error::PermissionDenied(format!(
                "writes to `{}` are not allowed",
                self.name
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn watch(&self, order_by: &str) -> Result<SnapshotStream, Error> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_watch.load(Ordering::SeqCst) {
            return Err(Error::PermissionDenied(format!(
                "missing or insufficient permissions to read `{}`",
                self.name
            )));
        }

        let order_by = order_by.to_string();
        let stream = WatchStream::new(self.documents.subscribe()).map(move |documents| {
            let mut documents = documents;
            documents.sort_by(|a, b| {
                let a = a.fields.get(&order_by).and_then(instant);
                let b = b.fields.get(&order_by).and_then(instant);
                b.cmp(&a)
            });
            Ok(documents)
        });
        Ok(Box::pin(stream))
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, Error> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.borrow().iter().find(|d| d.id == id).cloned())
    }

    async fn insert(&self, mut fields: Fields) -> Result<String, Error> {
        self.check_writable()?;
        let id = format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        fields.insert(
            "createdAt".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        self.put(id.clone(), fields);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: Fields) -> Result<(), Error> {
        self.check_writable()?;
        let mut found = false;
        self.documents.send_if_modified(|documents| {
            if let Some(document) = documents.iter_mut().find(|d| d.id == id) {
                document.fields.extend(patch);
                found = true;
            }
            found
        });
        if found {
            Ok(())
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let removed = self.documents.send_if_modified(|documents| {
            let before = documents.len();
            documents.retain(|d| d.id != id);
            documents.len() != before
        });
        if removed {
            Ok(())
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }
}

struct SharedSlots {
    slots: RwLock<HashMap<String, String>>,
    changes: broadcast::Sender<(u64, String)>,
    next_context: AtomicU64,
}

/// Local slots shared between execution contexts of one process.
///
/// Clones act as the same context. [`MemorySlots::open_context`] gives a
/// handle for another context: its writes are reported to the others.
#[derive(Clone)]
pub struct MemorySlots {
    shared: Arc<SharedSlots>,
    context: u64,
}

impl MemorySlots {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            shared: Arc::new(SharedSlots {
                slots: RwLock::new(HashMap::new()),
                changes,
                next_context: AtomicU64::new(1),
            }),
            context: 0,
        }
    }

    pub fn open_context(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            context: self.shared.next_context.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Default for MemorySlots {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotStore for MemorySlots {
    async fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .shared
            .slots
            .read()
            .ok()
            .and_then(|slots| slots.get(key).cloned()))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), Error> {
        if let Ok(mut slots) = self.shared.slots.write() {
            slots.insert(key.to_string(), value);
        }
        let _ = self.shared.changes.send((self.context, key.to_string()));
        Ok(())
    }

    fn changes(&self) -> SlotChanges {
        let me = self.context;
        let stream = BroadcastStream::new(self.shared.changes.subscribe()).filter_map(
            move |change| async move {
                match change {
                    Ok((context, key)) if context != me => Some(SlotChange { key }),
                    _ => None,
                }
            },
        );
        Box::pin(stream)
    }
}

/// An identity provider with users and claims held in memory.
pub struct MemoryIdentity {
    current: RwLock<Option<User>>,
    claims: RwLock<HashMap<String, Fields>>,
    changes: broadcast::Sender<Option<User>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            current: RwLock::new(None),
            claims: RwLock::new(HashMap::new()),
            changes,
        }
    }

    pub fn sign_in(&self, uid: &str, email: &str, claims: Fields) {
        let user = User {
            uid: uid.to_string(),
            email: email.to_string(),
        };
        if let Ok(mut all) = self.claims.write() {
            all.insert(uid.to_string(), claims);
        }
        if let Ok(mut current) = self.current.write() {
            *current = Some(user.clone());
        }
        let _ = self.changes.send(Some(user));
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<User> {
        self.current.read().ok()?.clone()
    }

    async fn id_token(&self, user: &User) -> Result<IdToken, Error> {
        let claims = self
            .claims
            .read()
            .ok()
            .and_then(|all| all.get(&user.uid).cloned())
            .unwrap_or_default();
        Ok(IdToken { claims })
    }

    async fn sign_out(&self) -> Result<(), Error> {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        let _ = self.changes.send(None);
        Ok(())
    }

    fn auth_changes(&self) -> broadcast::Receiver<Option<User>> {
        self.changes.subscribe()
    }
}
