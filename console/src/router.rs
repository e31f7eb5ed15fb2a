//! Routes operator mutations to the store that owns the record.

use std::collections::HashMap;

use riziq_types::{Draft, Fields, Kind, Origin, RecordKey, Status};
use serde_json::Value;
use tracing::{debug, info};

use crate::normalize::status_of;
use crate::render::Notice;
use crate::source::{LocalMutation, LocalStoreAdapter, RemoteCollectionAdapter, RemoteMutation};
use crate::status::{self, Transition};
use crate::Error;

/// The store a kind's records are written to.
#[derive(Clone)]
pub enum Target {
    Remote(RemoteCollectionAdapter),
    Local(LocalStoreAdapter),
}

impl Target {
    pub fn origin(&self) -> Origin {
        match self {
            Target::Remote(_) => Origin::Remote,
            Target::Local(_) => Origin::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mutation {
    /// Irrecoverable; refused unless `confirmed` is set.
    Delete { key: RecordKey, confirmed: bool },
    Transition { key: RecordKey, transition: Transition },
    Create(Draft),
}

/// What a successful mutation changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Deleted(RecordKey),
    StatusChanged { key: RecordKey, status: Status },
    Created(RecordKey),
}

impl Outcome {
    pub fn key(&self) -> &RecordKey {
        match self {
            Outcome::Deleted(key) | Outcome::Created(key) => key,
            Outcome::StatusChanged { key, .. } => key,
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            Outcome::Deleted(_) => Notice::info("Item deleted!"),
            Outcome::StatusChanged { status, .. } => {
                Notice::info(format!("Status updated to {}", status.label()))
            }
            Outcome::Created(key) if key.kind == Kind::JobPosting && key.origin == Origin::Remote => {
                Notice::info("Job published successfully!")
            }
            Outcome::Created(_) => Notice::info("Item added successfully!"),
        }
    }
}

/// Sends each mutation to exactly one adapter.
///
/// Remote failures come back as errors and nothing is applied locally;
/// the live subscription is the only path by which remote changes reach a
/// view.
pub struct MutationRouter {
    targets: HashMap<Kind, Target>,
}

impl MutationRouter {
    pub fn new(targets: HashMap<Kind, Target>) -> Self {
        Self { targets }
    }

    pub fn target(&self, kind: Kind, origin: Origin) -> Result<&Target, Error> {
        self.targets
            .get(&kind)
            .filter(|target| target.origin() == origin)
            .ok_or(Error::NoSource(kind, origin))
    }

    pub async fn route(&self, mutation: Mutation) -> Result<Outcome, Error> {
        debug!(?mutation, "routing mutation");
        match mutation {
            Mutation::Delete { key, confirmed } => {
                if !confirmed {
                    return Err(Error::ConfirmationRequired);
                }
                self.delete(key).await
            }
            Mutation::Transition { key, transition } => self.transition(key, transition).await,
            Mutation::Create(draft) => self.create(draft).await,
        }
    }

    async fn delete(&self, key: RecordKey) -> Result<Outcome, Error> {
        match self.target(key.kind, key.origin)? {
            Target::Remote(remote) => remote
                .mutate(&key.id, RemoteMutation::Delete)
                .await
                .map_err(rejected)?,
            Target::Local(local) => {
                local
                    .mutate(LocalMutation::Delete { id: key.id.clone() })
                    .await?;
            }
        }
        info!(%key, "record deleted");
        Ok(Outcome::Deleted(key))
    }

    async fn transition(&self, key: RecordKey, transition: Transition) -> Result<Outcome, Error> {
        let kind = key.kind;
        let status = match self.target(kind, key.origin)? {
            Target::Remote(remote) => {
                // Read the stored status rather than the last snapshot so
                // consecutive advances never skip a step.
                let document = remote
                    .get(&key.id)
                    .await
                    .map_err(rejected)?
                    .ok_or_else(|| Error::NotFound(key.id.clone()))?;
                let next = status::apply(kind, status_of(kind, &document.fields), transition)?;
                remote
                    .mutate(&key.id, RemoteMutation::Patch(status_patch(next)))
                    .await
                    .map_err(rejected)?;
                next
            }
            Target::Local(local) => {
                let fields = local
                    .update_with(&key.id, |fields| {
                        let next = status::apply(kind, status_of(kind, fields), transition)?;
                        fields.extend(status_patch(next));
                        Ok(())
                    })
                    .await?;
                status_of(kind, &fields)
            }
        };
        info!(%key, status = status.label(), "status changed");
        Ok(Outcome::StatusChanged { key, status })
    }

    async fn create(&self, draft: Draft) -> Result<Outcome, Error> {
        let kind = draft.kind();
        let target = self
            .targets
            .get(&kind)
            .ok_or(Error::NoSource(kind, Origin::Local))?;
        let fields = draft.into_fields();

        let key = match target {
            Target::Remote(remote) => {
                let id = remote.insert(fields).await.map_err(rejected)?;
                RecordKey::new(kind, Origin::Remote, id)
            }
            Target::Local(local) => {
                let id = local.mutate(LocalMutation::Insert(fields)).await?;
                RecordKey::new(kind, Origin::Local, id)
            }
        };
        info!(%key, "record created");
        Ok(Outcome::Created(key))
    }
}

fn status_patch(status: Status) -> Fields {
    let mut patch = Fields::new();
    patch.insert("status".to_string(), Value::from(status.label()));
    patch
}

/// Remote failures other than a vanished record or a timeout are rejections.
fn rejected(err: Error) -> Error {
    match err {
        Error::NotFound(_) | Error::Timeout(_) | Error::MutationRejected(_) => err,
        other => Error::MutationRejected(other.to_string()),
    }
}
