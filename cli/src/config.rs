use std::env;
use std::time::Duration;

use riziq_console::{ConsoleConfig, Deployment};
use riziq_types::Origin;
use tracing::info;

use crate::Error;

pub struct Config {
    pub database_url: String,
    pub deployment: Deployment,
    pub remote_timeout: Duration,
    pub poll_interval: Duration,
    pub admin_email: String,
}

impl Config {
    /// Reads the process environment, falling back to defaults.
    pub fn load() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let load = |key: &'static str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        Ok(Self {
            database_url: load("RIZIQ_DATABASE_URL", "sqlite://riziq.db"),
            deployment: Deployment {
                applications: origin(
                    "RIZIQ_APPLICATIONS_BACKEND",
                    load("RIZIQ_APPLICATIONS_BACKEND", "remote"),
                )?,
                jobs: origin("RIZIQ_JOBS_BACKEND", load("RIZIQ_JOBS_BACKEND", "remote"))?,
            },
            remote_timeout: millis(
                "RIZIQ_REMOTE_TIMEOUT_MS",
                load("RIZIQ_REMOTE_TIMEOUT_MS", "10000"),
            )?,
            poll_interval: millis("RIZIQ_POLL_INTERVAL_MS", load("RIZIQ_POLL_INTERVAL_MS", "250"))?,
            admin_email: load("RIZIQ_ADMIN_EMAIL", "admin@riziq.in"),
        })
    }

    pub fn console(&self) -> ConsoleConfig {
        ConsoleConfig {
            deployment: self.deployment,
            remote_timeout: self.remote_timeout,
        }
    }
}

fn origin(key: &'static str, value: String) -> Result<Origin, Error> {
    Origin::parse(&value).ok_or_else(|| Error::Config {
        key,
        reason: "expected `remote` or `local`".to_string(),
        value,
    })
}

fn millis(key: &'static str, value: String) -> Result<Duration, Error> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config {
            key,
            value,
            reason: "must be positive".to_string(),
        }),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(e) => Err(Error::Config {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://riziq.db");
        assert_eq!(config.deployment, Deployment::default());
        assert_eq!(config.remote_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.admin_email, "admin@riziq.in");
    }

    #[test]
    fn local_applications() {
        let config = config(&[("RIZIQ_APPLICATIONS_BACKEND", "Local")]).unwrap();
        assert_eq!(config.deployment.applications, Origin::Local);
        assert_eq!(config.deployment.jobs, Origin::Remote);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(matches!(
            config(&[("RIZIQ_JOBS_BACKEND", "cloud")]),
            Err(Error::Config { key: "RIZIQ_JOBS_BACKEND", .. })
        ));
        assert!(matches!(
            config(&[("RIZIQ_POLL_INTERVAL_MS", "soon")]),
            Err(Error::Config { key: "RIZIQ_POLL_INTERVAL_MS", .. })
        ));
        assert!(config(&[("RIZIQ_REMOTE_TIMEOUT_MS", "0")]).is_err());
    }
}
