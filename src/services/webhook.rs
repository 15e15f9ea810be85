//! Generic JSON webhook: `json://[user:pass@]host[:port]/path` (HTTP) and
//! `jsons://...` (HTTPS).

use super::{send_checked, Service};
use crate::core::Destination;
use crate::dispatcher::NotifierError;
use reqwest::blocking::Client;
use serde::Serialize;
use url::Url;

pub struct JsonWebhook {
    client: Client,
    url: Url,
    auth: Option<(String, Option<String>)>,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    version: &'static str,
    title: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl JsonWebhook {
    pub fn parse(destination: &Destination, client: Client) -> Result<Self, NotifierError> {
        let (scheme, rest) = destination
            .as_str()
            .split_once("://")
            .ok_or_else(|| NotifierError::invalid(destination, "missing scheme"))?;
        let http_scheme = if scheme.eq_ignore_ascii_case("jsons") {
            "https"
        } else {
            "http"
        };

        let mut url = Url::parse(&format!("{http_scheme}://{rest}"))
            .map_err(|e| NotifierError::invalid(destination, e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(NotifierError::invalid(destination, "missing host"));
        }

        let auth = if url.username().is_empty() {
            None
        } else {
            Some((
                url.username().to_string(),
                url.password().map(str::to_string),
            ))
        };
        // Credentials travel as a basic-auth header, not in the URL.
        let _ = url.set_username("");
        let _ = url.set_password(None);

        Ok(Self { client, url, auth })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl Service for JsonWebhook {
    fn name(&self) -> &str {
        "json"
    }

    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let payload = Payload {
            version: "1.0",
            title,
            message: body,
            kind: "info",
        };
        let mut request = self.client.post(self.url.clone()).json(&payload);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, password.as_deref());
        }
        send_checked(request, "JSON webhook")
    }
}
