//! Deployment choices for the console.

use std::time::Duration;

use riziq_types::{Kind, Origin};

/// Backend chosen for the kinds that can live in either store.
///
/// Applications and jobs exist both as remote collections and as local
/// slots. Every other kind is local-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub applications: Origin,
    pub jobs: Origin,
}

impl Deployment {
    pub fn origin_of(&self, kind: Kind) -> Origin {
        match kind {
            Kind::Application => self.applications,
            Kind::JobPosting => self.jobs,
            _ => Origin::Local,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            applications: Origin::Remote,
            jobs: Origin::Remote,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub deployment: Deployment,
    /// Upper bound on any single remote call.
    pub remote_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            deployment: Deployment::default(),
            remote_timeout: Duration::from_secs(10),
        }
    }
}
