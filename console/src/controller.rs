//! One live admin view: its sources, subscriptions, filter and sink.

use std::collections::HashMap;
use std::sync::Arc;

use riziq_types::{ApplicationStatus, Draft, Kind, Origin, RawItem, RecordKey};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::auth::{AdminSession, User};
use crate::cache::ViewCache;
use crate::config::ConsoleConfig;
use crate::merge::{KindFilter, View};
use crate::normalize::normalize;
use crate::render::{Notice, RenderSink};
use crate::router::{Mutation, MutationRouter, Target};
use crate::source::{
    DocumentCollection, LocalStoreAdapter, RemoteCollectionAdapter, SlotStore,
};
use crate::status::Transition;
use crate::sync::{SourceEvent, Subscriptions};
use crate::view::ViewKind;
use crate::Error;

/// What the operator asked a view to do.
#[derive(Debug, Clone)]
pub enum Command {
    /// `confirmed` must be set by the UI after asking the operator.
    Delete { key: RecordKey, confirmed: bool },
    AdvanceStatus { key: RecordKey },
    SetStatus { key: RecordKey, status: ApplicationStatus },
    Create(Draft),
    Inspect(RecordKey),
    SetFilter(KindFilter),
    SignOut,
}

/// Why [`ViewController::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    SignedOut,
    /// The command channel was closed.
    Closed,
}

/// The stores a view can draw from.
#[derive(Clone)]
pub struct Backends {
    pub collections: HashMap<Kind, Arc<dyn DocumentCollection>>,
    pub slots: Arc<dyn SlotStore>,
}

impl Backends {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self {
            collections: HashMap::new(),
            slots,
        }
    }

    pub fn with_collection(mut self, kind: Kind, collection: Arc<dyn DocumentCollection>) -> Self {
        self.collections.insert(kind, collection);
        self
    }
}

/// A live view over one or more record sources.
///
/// Built per screen from an [`AdminSession`]; dropping it releases every
/// subscription it holds. Source callbacks are queued and applied by
/// [`pump`](Self::pump) or [`run`](Self::run), so all view state is touched
/// from a single task.
pub struct ViewController<S: RenderSink> {
    session: AdminSession,
    view: ViewKind,
    sources: Vec<Target>,
    router: MutationRouter,
    cache: ViewCache,
    filter: KindFilter,
    subscriptions: Subscriptions,
    events: mpsc::UnboundedReceiver<SourceEvent>,
    auth_changes: broadcast::Receiver<Option<User>>,
    sink: S,
}

impl<S: RenderSink> ViewController<S> {
    /// Attaches every source of `view` and renders the first result.
    ///
    /// Local slots are read right away; remote snapshots arrive through
    /// [`pump`](Self::pump).
    pub async fn open(
        session: AdminSession,
        view: ViewKind,
        backends: &Backends,
        config: &ConsoleConfig,
        sink: S,
    ) -> Result<Self, Error> {
        let layout = view.sources(&config.deployment);

        let mut sources = Vec::with_capacity(layout.len());
        for (kind, origin) in &layout {
            let target = match origin {
                Origin::Remote => {
                    let collection = backends
                        .collections
                        .get(kind)
                        .ok_or(Error::NoSource(*kind, Origin::Remote))?;
                    Target::Remote(RemoteCollectionAdapter::new(
                        Arc::clone(collection),
                        config.remote_timeout,
                    ))
                }
                Origin::Local => {
                    Target::Local(LocalStoreAdapter::new(Arc::clone(&backends.slots), *kind))
                }
            };
            sources.push(target);
        }

        let router = MutationRouter::new(
            layout
                .iter()
                .map(|(kind, _)| *kind)
                .zip(sources.iter().cloned())
                .collect(),
        );
        let (events_tx, events) = mpsc::unbounded_channel();
        let auth_changes = session.identity().auth_changes();

        let mut controller = Self {
            session,
            view,
            sources,
            router,
            cache: ViewCache::new(layout),
            filter: KindFilter::All,
            subscriptions: Subscriptions::default(),
            events,
            auth_changes,
            sink,
        };

        for (index, target) in controller.sources.clone().iter().enumerate() {
            match target {
                Target::Remote(remote) => {
                    controller
                        .subscriptions
                        .attach_remote(index, remote, events_tx.clone());
                }
                Target::Local(local) => {
                    // Watch before reading so a write in between is still reported.
                    controller
                        .subscriptions
                        .attach_local(index, local, events_tx.clone());
                    let items = local.fetch_once().await;
                    controller.cache.replace(index, &items);
                }
            }
        }

        info!(view = %view, user = %controller.session.user().email, "view opened");
        controller.render();
        Ok(controller)
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn filter(&self) -> &KindFilter {
        &self.filter
    }

    /// The rows the sink was last given.
    pub fn current(&self) -> View {
        self.cache.merged(&self.filter)
    }

    /// Number of subscriptions still able to deliver.
    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.active()
    }

    /// Waits for the next source event and applies it.
    ///
    /// Returns `false` once no source can deliver anything any more.
    pub async fn pump(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.apply(event).await;
                true
            }
            None => false,
        }
    }

    /// Serves the view until the operator signs out or `commands` closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Exit {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.apply(event).await,
                command = commands.recv() => match command {
                    Some(Command::SignOut) => {
                        if let Err(e) = self.session.sign_out().await {
                            self.sink.notify(Notice::error(format!("Logout failed: {e}")));
                            continue;
                        }
                        return Exit::SignedOut;
                    }
                    Some(command) => {
                        let _ = self.dispatch(command).await;
                    }
                    None => return Exit::Closed,
                },
                change = self.auth_changes.recv() => match change {
                    Ok(Some(user)) if user.uid == self.session.user().uid => {}
                    Ok(_) | Err(RecvError::Closed) => {
                        info!(view = %self.view, "session ended");
                        return Exit::SignedOut;
                    }
                    Err(RecvError::Lagged(_)) => {}
                },
            }
        }
    }

    /// Carries out one command.
    ///
    /// Failures are shown on the sink before being returned. A record that
    /// vanished in the meantime is only a notice, not an error. An
    /// unconfirmed delete touches no store and is reported as an info notice.
    pub async fn dispatch(&mut self, command: Command) -> Result<(), Error> {
        debug!(?command, "dispatching command");
        match command {
            Command::SetFilter(filter) => {
                self.filter = filter;
                self.render();
                Ok(())
            }
            Command::Inspect(key) => self.inspect(key).await,
            Command::SignOut => self.session.sign_out().await,
            Command::Delete { key, confirmed } => {
                self.mutate(Mutation::Delete { key, confirmed }).await
            }
            Command::AdvanceStatus { key } => {
                self.mutate(Mutation::Transition {
                    key,
                    transition: Transition::Advance,
                })
                .await
            }
            Command::SetStatus { key, status } => {
                self.mutate(Mutation::Transition {
                    key,
                    transition: Transition::Set(status),
                })
                .await
            }
            Command::Create(draft) => self.mutate(Mutation::Create(draft)).await,
        }
    }

    /// Releases every subscription; the view stops updating.
    pub fn close(mut self) {
        info!(view = %self.view, "view closed");
        self.subscriptions.release_all();
    }

    async fn mutate(&mut self, mutation: Mutation) -> Result<(), Error> {
        match self.router.route(mutation).await {
            Ok(outcome) => {
                // Remote changes reach the view through the subscription.
                if outcome.key().origin == Origin::Local {
                    self.refresh_local(outcome.key().kind).await;
                    self.render();
                }
                self.sink.notify(outcome.notice());
                Ok(())
            }
            Err(Error::NotFound(id)) => {
                self.refresh_local_all().await;
                self.render();
                self.sink
                    .notify(Notice::info(format!("Item {id} no longer exists")));
                Ok(())
            }
            Err(Error::ConfirmationRequired) => {
                self.sink.notify(Notice::info("Delete not confirmed"));
                Err(Error::ConfirmationRequired)
            }
            Err(e) => {
                warn!(error = %e, "mutation failed");
                self.sink.notify(Notice::error(format!("Action failed: {e}")));
                Err(e)
            }
        }
    }

    async fn inspect(&mut self, key: RecordKey) -> Result<(), Error> {
        let target = match self.router.target(key.kind, key.origin) {
            Ok(target) => target.clone(),
            Err(e) => {
                self.sink.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        let found = match target {
            Target::Remote(remote) => match remote.get(&key.id).await {
                Ok(document) => document.map(RawItem::remote),
                Err(e) => {
                    self.sink
                        .notify(Notice::error(format!("Could not load {key}: {e}")));
                    return Err(e);
                }
            },
            Target::Local(local) => local
                .fetch_once()
                .await
                .into_iter()
                .find(|item| item.id == key.id),
        };

        match found {
            Some(item) => self.sink.detail(&normalize(&item, key.kind)),
            None => self
                .sink
                .notify(Notice::info(format!("Item {} no longer exists", key.id))),
        }
        Ok(())
    }

    async fn apply(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Snapshot { source, items } => {
                debug!(source, count = items.len(), "applying snapshot");
                self.cache.replace(source, &items);
                self.render();
            }
            SourceEvent::Failed { source, error } => {
                warn!(source, error = %error, "source stopped delivering");
                self.sink.notify(Notice::error(error.to_string()));
            }
            SourceEvent::SlotChanged { source } => {
                let Some((kind, _)) = self.cache.source_of(source) else {
                    return;
                };
                self.refresh_source(source).await;
                self.render();
                match kind {
                    Kind::Application => self.sink.notify(Notice::info("New application received!")),
                    Kind::ContactMessage => self.sink.notify(Notice::info("New message received!")),
                    _ => {}
                }
            }
        }
    }

    async fn refresh_source(&mut self, source: usize) {
        if let Some(Target::Local(local)) = self.sources.get(source).cloned() {
            let items = local.fetch_once().await;
            self.cache.replace(source, &items);
        }
    }

    async fn refresh_local(&mut self, kind: Kind) {
        let indexes: Vec<usize> = (0..self.sources.len())
            .filter(|i| self.cache.source_of(*i) == Some((kind, Origin::Local)))
            .collect();
        for index in indexes {
            self.refresh_source(index).await;
        }
    }

    async fn refresh_local_all(&mut self) {
        for index in 0..self.sources.len() {
            self.refresh_source(index).await;
        }
    }

    fn render(&mut self) {
        let view = self.cache.merged(&self.filter);
        self.sink.render(&view);
    }
}
