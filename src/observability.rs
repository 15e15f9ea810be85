//! Remote observability events for dispatch results.
//!
//! A dispatch emits one `DispatchEvent` to an `EventSink`. The sink is either
//! a `LokiSink` pushing to a log-aggregation endpoint or a `NoopSink` when no
//! endpoint is configured.

use crate::config::Settings;
use crate::core::{Destination, DispatchResult, EventSink, Severity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// The single event emitted for a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    DeliverySucceeded {
        destinations: Vec<Destination>,
        title: String,
    },
    DeliveryFailed {
        destinations: Vec<Destination>,
        title: String,
    },
}

impl DispatchEvent {
    pub fn from_result(title: &str, result: &DispatchResult) -> Self {
        let destinations = result.destinations().cloned().collect();
        let title = title.to_string();
        if result.overall_success {
            DispatchEvent::DeliverySucceeded {
                destinations,
                title,
            }
        } else {
            DispatchEvent::DeliveryFailed {
                destinations,
                title,
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DispatchEvent::DeliverySucceeded { .. } => Severity::Info,
            DispatchEvent::DeliveryFailed { .. } => Severity::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            DispatchEvent::DeliverySucceeded {
                destinations,
                title,
            } => format!(
                "Notification \"{}\" sent to [{}]",
                title,
                redacted_list(destinations)
            ),
            DispatchEvent::DeliveryFailed {
                destinations,
                title,
            } => format!(
                "Failed to send notification \"{}\" to [{}]",
                title,
                redacted_list(destinations)
            ),
        }
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        let status = match self {
            DispatchEvent::DeliverySucceeded { .. } => "success",
            DispatchEvent::DeliveryFailed { .. } => "failure",
        };
        BTreeMap::from([("status".to_string(), status.to_string())])
    }

    pub fn emit_to(&self, sink: &dyn EventSink) {
        sink.emit(self.severity(), &self.message(), &self.tags());
    }
}

fn redacted_list(destinations: &[Destination]) -> String {
    destinations
        .iter()
        .map(Destination::redacted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _severity: Severity, _message: &str, _tags: &BTreeMap<String, String>) {}
}

/// Pushes events to a Loki push endpoint (`/loki/api/v1/push`).
pub struct LokiSink {
    client: reqwest::blocking::Client,
    url: String,
    labels: BTreeMap<String, String>,
}

impl LokiSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let labels = BTreeMap::from([
            ("application".to_string(), "notifier".to_string()),
            ("logger".to_string(), "notifier".to_string()),
        ]);
        Ok(Self {
            client,
            url: url.into(),
            labels,
        })
    }

    fn payload(
        &self,
        severity: Severity,
        message: &str,
        tags: &BTreeMap<String, String>,
    ) -> PushRequest {
        let mut stream = self.labels.clone();
        stream.insert("severity".to_string(), severity.as_str().to_string());
        stream.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));

        let timestamp = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_string();
        PushRequest {
            streams: vec![PushStream {
                stream,
                values: vec![[timestamp, message.to_string()]],
            }],
        }
    }
}

impl EventSink for LokiSink {
    fn emit(&self, severity: Severity, message: &str, tags: &BTreeMap<String, String>) {
        let payload = self.payload(severity, message, tags);
        match self.client.post(&self.url).json(&payload).send() {
            Ok(res) if res.status().is_success() => {
                debug!(url = %self.url, "Pushed event to Loki");
            }
            Ok(res) => {
                let status = res.status();
                let text = res.text().unwrap_or_default();
                warn!(%status, body = %text, "Loki rejected event");
            }
            Err(e) => {
                warn!(error = %e, "Failed to push event to Loki");
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest {
    streams: Vec<PushStream>,
}

#[derive(Debug, Serialize)]
struct PushStream {
    stream: BTreeMap<String, String>,
    values: Vec<[String; 2]>,
}

/// Builds the sink described by the settings: Loki when an endpoint is set,
/// otherwise a no-op.
pub fn sink_from_settings(settings: &Settings) -> Box<dyn EventSink> {
    let Some(url) = settings.loki_url() else {
        return Box::new(NoopSink);
    };
    match LokiSink::new(url, settings.timeout()) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!(error = %e, "Failed to build Loki client, events will not be pushed");
            Box::new(NoopSink)
        }
    }
}
