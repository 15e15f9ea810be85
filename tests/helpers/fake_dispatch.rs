//! A `Dispatch` stand-in that records requests instead of delivering them.

use notifier::{
    DeliveryOutcome, Dispatch, DispatchResult, NotificationRequest, NotifierError,
};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeDispatch {
    requests: Arc<Mutex<Vec<NotificationRequest>>>,
    success: bool,
}

impl FakeDispatch {
    pub fn new(success: bool) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            success,
        }
    }

    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Dispatch for FakeDispatch {
    fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchResult, NotifierError> {
        self.requests.lock().unwrap().push(request.clone());
        let outcome = if self.success {
            DeliveryOutcome::Delivered
        } else {
            DeliveryOutcome::Failed("service unavailable".to_string())
        };
        Ok(DispatchResult {
            overall_success: self.success,
            per_destination: request
                .destinations
                .iter()
                .cloned()
                .map(|destination| (destination, outcome.clone()))
                .collect(),
        })
    }
}
