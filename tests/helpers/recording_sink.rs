//! An `EventSink` that keeps every event it is given.

use notifier::{EventSink, Severity};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub severity: Severity,
    pub message: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, severity: Severity, message: &str, tags: &BTreeMap<String, String>) {
        self.events.lock().unwrap().push(RecordedEvent {
            severity,
            message: message.to_string(),
            tags: tags.clone(),
        });
    }
}
