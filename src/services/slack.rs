//! Slack incoming webhooks: `slack://[botname@]TokenA/TokenB/TokenC[/#channel]`.

use super::{post_json, split_user, Segments, Service};
use crate::core::Destination;
use crate::dispatcher::NotifierError;
use reqwest::blocking::Client;
use serde::Serialize;

const WEBHOOK_BASE: &str = "https://hooks.slack.com/services";

pub struct SlackWebhook {
    client: Client,
    endpoint: String,
    username: Option<String>,
    channel: Option<String>,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

impl SlackWebhook {
    pub fn parse(destination: &Destination, client: Client) -> Result<Self, NotifierError> {
        let segments = Segments::of(destination);
        let [first, token_b, token_c, rest @ ..] = segments.parts.as_slice() else {
            return Err(NotifierError::invalid(
                destination,
                "expected slack://TokenA/TokenB/TokenC",
            ));
        };
        let (username, token_a) = split_user(first);
        if token_a.is_empty() {
            return Err(NotifierError::invalid(destination, "missing TokenA"));
        }

        let channel = rest.first().map(|channel| {
            if channel.starts_with('#') || channel.starts_with('@') {
                channel.to_string()
            } else {
                format!("#{channel}")
            }
        });

        Ok(Self {
            client,
            endpoint: format!("{WEBHOOK_BASE}/{token_a}/{token_b}/{token_c}"),
            username: username.map(str::to_string),
            channel,
        })
    }

    fn payload(&self, title: &str, body: &str) -> Payload<'_> {
        let text = if title.is_empty() {
            body.to_string()
        } else {
            format!("*{title}*\n{body}")
        };
        Payload {
            text,
            username: self.username.as_deref(),
            channel: self.channel.as_deref(),
        }
    }
}

impl Service for SlackWebhook {
    fn name(&self) -> &str {
        "slack"
    }

    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        post_json(&self.client, &self.endpoint, &self.payload(title, body), "Slack")
    }
}
