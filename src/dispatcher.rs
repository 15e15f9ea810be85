//! Fans a notification out to its destinations and aggregates the outcome.

use crate::core::{
    BatchOutcome, DeliveryOutcome, Destination, DispatchResult, EventSink, NotificationRequest,
    Notifier,
};
use crate::observability::{DispatchEvent, NoopSink};
use crate::services::ServiceRegistry;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Setup errors raised before any delivery is attempted.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Unsupported destination scheme '{scheme}' in {destination}")]
    UnsupportedScheme { scheme: String, destination: String },

    #[error("Invalid destination {destination}: {reason}")]
    InvalidDestination { destination: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl NotifierError {
    pub(crate) fn invalid(destination: &Destination, reason: impl Into<String>) -> Self {
        NotifierError::InvalidDestination {
            destination: destination.redacted(),
            reason: reason.into(),
        }
    }
}

/// Sends one request through a `Notifier` and reports to an `EventSink`.
pub struct Dispatcher {
    sink: Box<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// A dispatcher that emits no observability events.
    pub fn without_sink() -> Self {
        Self::new(Box::new(NoopSink))
    }

    /// Registers every non-blank destination in order, then makes a single
    /// batched delivery call and emits exactly one event describing it.
    ///
    /// Delivery failure is part of the returned `DispatchResult`; only a
    /// registration failure is returned as an error, in which case nothing
    /// is delivered and no event is emitted.
    #[instrument(skip_all, fields(title = %request.title))]
    pub fn send<N: Notifier + ?Sized>(
        &self,
        request: &NotificationRequest,
        notifier: &mut N,
    ) -> Result<DispatchResult, NotifierError> {
        let destinations: Vec<Destination> = request
            .destinations
            .iter()
            .filter(|destination| !destination.is_blank())
            .cloned()
            .collect();

        for destination in &destinations {
            notifier.register(destination)?;
            debug!(destination = %destination.redacted(), "Registered destination");
        }

        let batch = notifier.deliver(&request.title, &request.body);
        let result = aggregate(destinations, batch);

        if result.overall_success {
            info!(
                destinations = result.per_destination.len(),
                "Notification delivered"
            );
        } else {
            error!(
                destinations = result.per_destination.len(),
                "Notification delivery failed"
            );
        }
        for (destination, reason) in result.failures() {
            debug!(destination = %destination.redacted(), %reason, "Destination failed");
        }

        DispatchEvent::from_result(&request.title, &result).emit_to(self.sink.as_ref());
        Ok(result)
    }
}

/// Pairs each registered destination with its outcome.
fn aggregate(destinations: Vec<Destination>, batch: BatchOutcome) -> DispatchResult {
    match batch {
        BatchOutcome::Aggregate(verdict) => {
            // Nothing was delivered to an empty batch, whatever the verdict.
            let success = verdict && !destinations.is_empty();
            DispatchResult {
                overall_success: success,
                per_destination: destinations
                    .into_iter()
                    .map(|destination| (destination, DeliveryOutcome::from_verdict(success)))
                    .collect(),
            }
        }
        BatchOutcome::PerDestination(outcomes) => {
            let mut outcomes = outcomes.into_iter();
            let per_destination: Vec<_> = destinations
                .into_iter()
                .map(|destination| {
                    let outcome = outcomes.next().unwrap_or_else(|| {
                        DeliveryOutcome::Failed("no outcome reported".to_string())
                    });
                    (destination, outcome)
                })
                .collect();
            DispatchResult {
                overall_success: per_destination
                    .iter()
                    .any(|(_, outcome)| outcome.is_delivered()),
                per_destination,
            }
        }
    }
}

/// The dispatch path as seen by the command layer.
pub trait Dispatch {
    fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchResult, NotifierError>;
}

/// Dispatches each request through a fresh `ServiceRegistry`.
pub struct RegistryDispatcher {
    dispatcher: Dispatcher,
    timeout: Duration,
}

impl RegistryDispatcher {
    pub fn new(dispatcher: Dispatcher, timeout: Duration) -> Self {
        Self {
            dispatcher,
            timeout,
        }
    }
}

impl Dispatch for RegistryDispatcher {
    fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchResult, NotifierError> {
        let mut registry = ServiceRegistry::new(self.timeout)?;
        self.dispatcher.send(request, &mut registry)
    }
}
