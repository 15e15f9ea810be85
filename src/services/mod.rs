//! Delivery services and the registry that fans a notification out to them.
//!
//! Each destination descriptor is parsed into a `Service` according to its
//! scheme when it is registered. The `ServiceRegistry` is the production
//! `Notifier`: one `deliver` call sends to every registered service in order
//! and reports an outcome for each.

#[cfg(feature = "email")]
pub mod email;
pub mod discord;
pub mod ntfy;
pub mod slack;
pub mod telegram;
pub mod webhook;

use crate::core::{BatchOutcome, DeliveryOutcome, Destination, Notifier};
use crate::dispatcher::NotifierError;
use anyhow::bail;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// A single delivery target built from a destination descriptor.
pub trait Service: Send + Sync {
    /// Short protocol name for logging (e.g. "slack", "telegram").
    fn name(&self) -> &str;

    /// Sends the title and body to this target.
    fn send(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

/// The production `Notifier`, backed by real delivery services.
pub struct ServiceRegistry {
    client: Client,
    #[cfg(feature = "email")]
    timeout: Duration,
    services: Vec<(Destination, Box<dyn Service>)>,
}

impl ServiceRegistry {
    /// Creates an empty registry whose HTTP calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, NotifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            #[cfg(feature = "email")]
            timeout,
            services: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Protocol names of the registered services, in registration order.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|(_, service)| service.name()).collect()
    }

    fn build(&self, destination: &Destination) -> Result<Box<dyn Service>, NotifierError> {
        let Some(scheme) = destination.scheme() else {
            return Err(NotifierError::invalid(destination, "missing scheme"));
        };

        let service: Box<dyn Service> = match scheme.as_str() {
            "json" | "jsons" => Box::new(webhook::JsonWebhook::parse(destination, self.client.clone())?),
            "slack" => Box::new(slack::SlackWebhook::parse(destination, self.client.clone())?),
            "discord" => Box::new(discord::DiscordWebhook::parse(destination, self.client.clone())?),
            "tgram" => Box::new(telegram::TelegramBot::parse(destination, self.client.clone())?),
            "ntfy" | "ntfys" => Box::new(ntfy::Ntfy::parse(destination, self.client.clone())?),
            #[cfg(feature = "email")]
            "mailto" | "mailtos" => Box::new(email::Email::parse(destination, self.timeout)?),
            _ => {
                return Err(NotifierError::UnsupportedScheme {
                    scheme,
                    destination: destination.redacted(),
                })
            }
        };
        Ok(service)
    }
}

impl Notifier for ServiceRegistry {
    fn register(&mut self, destination: &Destination) -> Result<(), NotifierError> {
        let service = self.build(destination)?;
        self.services.push((destination.clone(), service));
        Ok(())
    }

    #[instrument(skip_all, fields(count = self.services.len()))]
    fn deliver(&mut self, title: &str, body: &str) -> BatchOutcome {
        let outcomes = self
            .services
            .iter()
            .map(|(destination, service)| match service.send(title, body) {
                Ok(()) => {
                    info!(service = service.name(), "Delivered notification");
                    DeliveryOutcome::Delivered
                }
                Err(e) => {
                    warn!(
                        service = service.name(),
                        destination = %destination.redacted(),
                        error = %format!("{e:#}"),
                        "Failed to deliver notification"
                    );
                    DeliveryOutcome::Failed(format!("{e:#}"))
                }
            })
            .collect();
        BatchOutcome::PerDestination(outcomes)
    }
}

// =============================================================================
// Descriptor parsing helpers
// =============================================================================

/// The path-like part of a descriptor: everything after `://` up to any query
/// string, split on `/`. Empty segments are dropped.
pub(crate) struct Segments<'a> {
    pub parts: Vec<&'a str>,
}

impl<'a> Segments<'a> {
    pub fn of(destination: &'a Destination) -> Self {
        let rest = destination
            .as_str()
            .split_once("://")
            .map_or("", |(_, rest)| rest);
        let path = rest.split_once('?').map_or(rest, |(path, _)| path);
        Self {
            parts: path.split('/').filter(|part| !part.is_empty()).collect(),
        }
    }
}

/// Splits an optional `user@` prefix off the first segment.
pub(crate) fn split_user(segment: &str) -> (Option<&str>, &str) {
    match segment.rsplit_once('@') {
        Some((user, rest)) if !user.is_empty() => (Some(user), rest),
        Some((_, rest)) => (None, rest),
        None => (None, segment),
    }
}

/// Sends a prepared request and turns a non-2xx status into an error.
pub(crate) fn send_checked(request: RequestBuilder, service: &str) -> anyhow::Result<()> {
    let response = request.send()?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let text = response.text().unwrap_or_default();
    bail!("{} returned {}: {}", service, status, text);
}

/// POSTs a JSON payload and checks the response status.
pub(crate) fn post_json(
    client: &Client,
    url: &str,
    payload: &impl Serialize,
    service: &str,
) -> anyhow::Result<()> {
    send_checked(client.post(url).json(payload), service)
}
