//! Live record views for the Riziq admin console.
//!
//! `riziq-console` keeps an admin's table in step with every store that
//! holds records for it. Remote document collections are followed through
//! live queries, local slots are re-read whenever another context writes
//! them, and everything is normalized into one [`Record`] shape, merged and
//! sorted newest first.
//!
//! # Features
//!
//! - Admin gate: no view, subscription or fetch without an [`AdminSession`]
//! - Snapshot-replace caching per source, never patched incrementally
//! - Mutations routed to exactly one owning store, with remote changes
//!   reaching the view only through its subscription
//! - Subscriptions released when the view is dropped
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use riziq_console::memory::{MemoryCollection, MemoryIdentity, MemorySlots};
//! use riziq_console::{guard, Backends, ConsoleConfig, Gate, Notice, RenderSink, Route, View, ViewController};
//! use riziq_types::Kind;
//!
//! struct Print;
//!
//! impl RenderSink for Print {
//!     fn render(&mut self, view: &View) {
//!         println!("{} rows", view.len());
//!     }
//!
//!     fn notify(&mut self, notice: Notice) {
//!         println!("{}", notice.message());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let identity = Arc::new(MemoryIdentity::new());
//!     let backends = Backends::new(Arc::new(MemorySlots::new()))
//!         .with_collection(Kind::Application, Arc::new(MemoryCollection::new("applications")))
//!         .with_collection(Kind::JobPosting, Arc::new(MemoryCollection::new("jobs")));
//!
//!     if let Gate::Enter { session, view } = guard(identity, Route::Login).await {
//!         let mut controller =
//!             ViewController::open(session, view, &backends, &ConsoleConfig::default(), Print).await?;
//!         controller.pump().await;
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod cache;
mod config;
mod controller;
mod error;
pub mod memory;
mod merge;
mod normalize;
mod render;
mod router;
mod source;
mod status;
mod sync;
mod view;

pub use auth::{authorize, guard, AdminSession, Gate, IdToken, IdentityProvider, User};
pub use cache::ViewCache;
pub use config::{ConsoleConfig, Deployment};
pub use controller::{Backends, Command, Exit, ViewController};
pub use error::Error;
pub use merge::{merge, EmptyState, KindFilter, View};
pub use normalize::{instant, normalize, status_of};
pub use render::{Notice, RenderSink};
pub use router::{Mutation, MutationRouter, Outcome, Target};
pub use source::{
    DocumentCollection, LocalMutation, LocalStoreAdapter, RemoteCollectionAdapter,
    RemoteMutation, SlotChange, SlotChanges, SlotStore, SnapshotStream, SubscriptionHandle,
};
pub use status::{apply as apply_transition, Transition};
pub use view::{Route, ViewKind};

pub use riziq_types::Record;
