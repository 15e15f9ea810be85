//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments using `clap`. The global
//! flags are also a `figment` provider, so they override settings taken from
//! the environment.

use clap::{Args, Parser, Subcommand};
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Relays a notification to the destinations of a configured channel.
#[derive(Parser, Debug)]
#[command(name = "notifier", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging level (overrides NOTIFIER_LOG_LEVEL).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Exit non-zero when a notification cannot be sent.
    #[arg(long, global = true)]
    pub strict_exit: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Send a notification to every destination of a channel.
    Send(SendArgs),
    /// Send a notification to the destinations listed in NOTIFIER_URLS.
    Test(TestArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Notification title.
    #[arg(long)]
    pub title: String,

    /// Notification body.
    #[arg(long)]
    pub body: String,

    /// Channel name as declared in the config file.
    #[arg(long)]
    pub channel: String,

    /// Path to the YAML channel file.
    #[arg(long, value_name = "FILE", default_value = "config.yml")]
    pub config: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// Notification title.
    #[arg(long, default_value = "Test Notification")]
    pub title: String,

    /// Notification body.
    #[arg(long, default_value = "This is a test notification.")]
    pub body: String,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        // Only an explicit flag overrides; absence leaves the env/default value.
        if self.strict_exit {
            dict.insert("exit_policy".into(), Value::from("strict"));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
