//! Discord webhooks: `discord://[username@]WebhookID/WebhookToken`.

use super::{post_json, split_user, Segments, Service};
use crate::core::Destination;
use crate::dispatcher::NotifierError;
use reqwest::blocking::Client;
use serde::Serialize;

const WEBHOOK_BASE: &str = "https://discord.com/api/webhooks";

pub struct DiscordWebhook {
    client: Client,
    endpoint: String,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

impl DiscordWebhook {
    pub fn parse(destination: &Destination, client: Client) -> Result<Self, NotifierError> {
        let segments = Segments::of(destination);
        let [first, token, ..] = segments.parts.as_slice() else {
            return Err(NotifierError::invalid(
                destination,
                "expected discord://WebhookID/WebhookToken",
            ));
        };
        let (username, webhook_id) = split_user(first);
        if webhook_id.is_empty() || !webhook_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(NotifierError::invalid(destination, "webhook id must be numeric"));
        }

        Ok(Self {
            client,
            endpoint: format!("{WEBHOOK_BASE}/{webhook_id}/{token}"),
            username: username.map(str::to_string),
        })
    }

    fn payload(&self, title: &str, body: &str) -> Payload<'_> {
        let content = if title.is_empty() {
            body.to_string()
        } else {
            format!("**{title}**\r\n{body}")
        };
        Payload {
            content,
            username: self.username.as_deref(),
        }
    }
}

impl Service for DiscordWebhook {
    fn name(&self) -> &str {
        "discord"
    }

    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        post_json(&self.client, &self.endpoint, &self.payload(title, body), "Discord")
    }
}
