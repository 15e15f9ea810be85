//! Runtime settings for the notifier.
//!
//! The channel file is handled by `channels`; this module covers everything
//! else. Settings are layered with `figment`: built-in defaults, then
//! `NOTIFIER_*` environment variables, then command-line flags.

use crate::cli::Cli;
use crate::core::Destination;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How command outcomes map to process exit codes.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Every outcome exits 0.
    #[default]
    AlwaysZero,
    /// Failures exit non-zero, with a distinct code per failure kind.
    Strict,
}

/// The main settings struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// The logging level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Loki push endpoint. Events are only emitted when this is set.
    pub loki_url: Option<String>,
    /// Comma-separated destinations used by the `test` command.
    pub urls: Option<String>,
    /// Exit-code policy for command outcomes.
    pub exit_policy: ExitPolicy,
    /// Timeout for outbound HTTP calls, in seconds.
    pub timeout_seconds: u64,
}

impl Settings {
    /// Loads settings from defaults, the environment and the parsed CLI.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            // e.g. NOTIFIER_LOKI_URL=http://localhost:3100/loki/api/v1/push
            .merge(Env::prefixed("NOTIFIER_"))
            .merge(cli)
            .extract()
    }

    pub fn loki_url(&self) -> Option<&str> {
        self.loki_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The destinations listed in `urls`, blanks removed.
    pub fn destinations(&self) -> Vec<Destination> {
        self.urls
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|url| Destination::new(url.trim()))
            .filter(|destination| !destination.is_blank())
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            loki_url: None,
            urls: None,
            exit_policy: ExitPolicy::AlwaysZero,
            timeout_seconds: 10,
        }
    }
}
