//! SQLite backends for the Riziq admin console.
//!
//! One database file holds the hosted collections, the local slots and the
//! user directory. Every write is appended to a change log that live queries
//! poll, so several console processes on the same file see each other's
//! writes.

mod changes;
mod collection;
pub mod db;
mod error;
mod identity;
pub mod models;
mod slots;

pub use collection::SqliteCollection;
pub use error::Error;
pub use identity::{DirectoryIdentity, SqliteDirectory};
pub use slots::SqliteSlots;
