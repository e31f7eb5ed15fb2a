//! Terminal front end for the Riziq admin console.
//!
//! `riziq-admin` prints one live view as a numbered table and reads
//! operator commands from stdin; `grant-admin` gives a directory user the
//! admin claim. Both read their settings from `RIZIQ_*` environment
//! variables (see [`Config`]).

mod config;
mod error;
mod input;
mod table;

pub use config::Config;
pub use error::Error;
pub use input::{Input, HELP};
pub use table::{Rows, TableSink};

/// Logs to stderr, filtered by `RUST_LOG`, so stdout carries only the table.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
