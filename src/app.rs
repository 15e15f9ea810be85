//! Command handlers, decoupled from the entry point.
//!
//! Each handler writes its human-readable result to the given writer and
//! returns a `CommandOutcome`. No error is fatal at this layer: every failure
//! is reported as a line of output and a distinct outcome, which the binary
//! turns into an exit code according to the configured `ExitPolicy`.

use crate::channels::{Channels, ConfigError};
use crate::cli::{Command, SendArgs, TestArgs};
use crate::config::{ExitPolicy, Settings};
use crate::core::{Destination, NotificationRequest};
use crate::dispatcher::Dispatch;
use std::io::{self, Write};
use tracing::{info, instrument, warn};

/// What happened when a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Sent,
    DeliveryFailed,
    ConfigNotFound,
    ConfigInvalid,
    UnknownChannel,
    InvalidDestination,
    NoDestinations,
}

impl CommandOutcome {
    pub fn exit_code(self, policy: ExitPolicy) -> u8 {
        match policy {
            ExitPolicy::AlwaysZero => 0,
            ExitPolicy::Strict => match self {
                CommandOutcome::Sent => 0,
                CommandOutcome::DeliveryFailed => 1,
                CommandOutcome::ConfigNotFound | CommandOutcome::ConfigInvalid => 2,
                CommandOutcome::UnknownChannel | CommandOutcome::NoDestinations => 3,
                CommandOutcome::InvalidDestination => 4,
            },
        }
    }
}

/// Runs the parsed command.
pub fn run(
    command: &Command,
    settings: &Settings,
    dispatcher: &dyn Dispatch,
    out: &mut dyn Write,
) -> io::Result<CommandOutcome> {
    match command {
        Command::Send(args) => send(args, dispatcher, out),
        Command::Test(args) => test(args, &settings.destinations(), dispatcher, out),
    }
}

/// `send`: resolves the channel from the config file and dispatches to it.
#[instrument(skip_all, fields(channel = %args.channel))]
pub fn send(
    args: &SendArgs,
    dispatcher: &dyn Dispatch,
    out: &mut dyn Write,
) -> io::Result<CommandOutcome> {
    let channels = match Channels::load(&args.config) {
        Ok(channels) => channels,
        Err(err) => {
            warn!(error = %err, "Could not load channel configuration");
            writeln!(out, "Error: {err}")?;
            return Ok(match err {
                ConfigError::NotFound { .. } => CommandOutcome::ConfigNotFound,
                ConfigError::Read { .. } | ConfigError::Parse { .. } => {
                    CommandOutcome::ConfigInvalid
                }
            });
        }
    };

    let Some(destinations) = channels.get(&args.channel) else {
        warn!("Channel not found in configuration");
        writeln!(
            out,
            "Error: channel '{}' not found in {}",
            args.channel,
            args.config.display()
        )?;
        return Ok(CommandOutcome::UnknownChannel);
    };

    info!(destinations = destinations.len(), "Resolved channel");
    deliver(&args.title, &args.body, destinations, dispatcher, out)
}

/// `test`: dispatches to the ad-hoc destinations from the environment.
pub fn test(
    args: &TestArgs,
    destinations: &[Destination],
    dispatcher: &dyn Dispatch,
    out: &mut dyn Write,
) -> io::Result<CommandOutcome> {
    if destinations.is_empty() {
        writeln!(out, "NOTIFIER_URLS environment variable not set.")?;
        return Ok(CommandOutcome::NoDestinations);
    }
    deliver(&args.title, &args.body, destinations, dispatcher, out)
}

fn deliver(
    title: &str,
    body: &str,
    destinations: &[Destination],
    dispatcher: &dyn Dispatch,
    out: &mut dyn Write,
) -> io::Result<CommandOutcome> {
    let request = NotificationRequest::new(title, body, destinations.iter().cloned());
    let result = match dispatcher.dispatch(&request) {
        Ok(result) => result,
        Err(err) => {
            writeln!(out, "Error: {err}")?;
            return Ok(CommandOutcome::InvalidDestination);
        }
    };

    if result.overall_success {
        writeln!(out, "Notification sent successfully")?;
    } else {
        writeln!(out, "Failed to send notification")?;
    }
    for (destination, reason) in result.failures() {
        writeln!(out, "  {}: {}", destination.redacted(), reason)?;
    }

    Ok(if result.overall_success {
        CommandOutcome::Sent
    } else {
        CommandOutcome::DeliveryFailed
    })
}
