//! ntfy publishing: `ntfy://topic` (ntfy.sh), `ntfy://[user:pass@]host[:port]/topic`
//! over HTTP, and `ntfys://...` over HTTPS.

use super::{send_checked, split_user, Segments, Service};
use crate::core::Destination;
use crate::dispatcher::NotifierError;
use reqwest::blocking::Client;
use serde::Serialize;

const DEFAULT_SERVER: &str = "https://ntfy.sh";

pub struct Ntfy {
    client: Client,
    server: String,
    topic: String,
    auth: Option<(String, Option<String>)>,
}

#[derive(Debug, Serialize)]
struct Publish<'a> {
    topic: &'a str,
    title: &'a str,
    message: &'a str,
}

impl Ntfy {
    pub fn parse(destination: &Destination, client: Client) -> Result<Self, NotifierError> {
        let secure = destination.scheme().as_deref() == Some("ntfys");
        let segments = Segments::of(destination);

        let (server, auth, topic) = match segments.parts.as_slice() {
            [topic] => (DEFAULT_SERVER.to_string(), None, *topic),
            [host, topic] => {
                let (userinfo, host) = split_user(host);
                let auth = userinfo.map(|userinfo| match userinfo.split_once(':') {
                    Some((user, password)) => (user.to_string(), Some(password.to_string())),
                    None => (userinfo.to_string(), None),
                });
                let scheme = if secure { "https" } else { "http" };
                (format!("{scheme}://{host}"), auth, *topic)
            }
            _ => {
                return Err(NotifierError::invalid(
                    destination,
                    "expected ntfy://topic or ntfy://host/topic",
                ))
            }
        };

        let valid_topic = topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if topic.is_empty() || !valid_topic {
            return Err(NotifierError::invalid(destination, "invalid topic name"));
        }

        Ok(Self {
            client,
            server,
            topic: topic.to_string(),
            auth,
        })
    }
}

impl Service for Ntfy {
    fn name(&self) -> &str {
        "ntfy"
    }

    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let publish = Publish {
            topic: &self.topic,
            title,
            message: body,
        };
        let mut request = self.client.post(&self.server).json(&publish);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, password.as_deref());
        }
        send_checked(request, "ntfy")
    }
}
