//! The production dispatch path against mock HTTP services.

use mockito::Matcher;
use notifier::observability::LokiSink;
use notifier::{
    DeliveryOutcome, Destination, Dispatch, Dispatcher, NotificationRequest, NotifierError,
    RegistryDispatcher,
};
use serde_json::json;
use std::time::Duration;

fn request(destinations: Vec<String>) -> NotificationRequest {
    NotificationRequest::new(
        "Nightly build",
        "All green",
        destinations.into_iter().map(Destination::new),
    )
}

#[test]
fn test_one_failing_destination_does_not_fail_the_dispatch() {
    let mut server = mockito::Server::new();
    let host = server.host_with_port();
    let up = server.mock("POST", "/up").with_status(200).create();
    let down = server.mock("POST", "/down").with_status(502).create();
    let loki = server
        .mock("POST", "/loki")
        .match_body(Matcher::PartialJson(json!({
            "streams": [{"stream": {"severity": "info", "status": "success"}}]
        })))
        .with_status(204)
        .create();

    let sink = LokiSink::new(format!("{}/loki", server.url()), Duration::from_secs(5)).unwrap();
    let dispatcher = RegistryDispatcher::new(Dispatcher::new(Box::new(sink)), Duration::from_secs(5));

    let result = dispatcher
        .dispatch(&request(vec![
            format!("json://{host}/down"),
            String::new(),
            format!("json://{host}/up"),
        ]))
        .unwrap();

    assert!(result.overall_success);
    assert_eq!(result.per_destination.len(), 2);
    assert!(matches!(
        &result.per_destination[0].1,
        DeliveryOutcome::Failed(reason) if reason.contains("502")
    ));
    assert_eq!(result.per_destination[1].1, DeliveryOutcome::Delivered);
    up.assert();
    down.assert();
    loki.assert();
}

#[test]
fn test_every_destination_failing_fails_the_dispatch() {
    let mut server = mockito::Server::new();
    let host = server.host_with_port();
    let down = server.mock("POST", "/down").with_status(500).expect(2).create();

    let dispatcher = RegistryDispatcher::new(Dispatcher::without_sink(), Duration::from_secs(5));
    let result = dispatcher
        .dispatch(&request(vec![
            format!("json://{host}/down"),
            format!("json://{host}/down"),
        ]))
        .unwrap();

    assert!(!result.overall_success);
    assert_eq!(result.failures().count(), 2);
    down.assert();
}

#[test]
fn test_bad_destination_stops_before_any_delivery() {
    let mut server = mockito::Server::new();
    let host = server.host_with_port();
    let hook = server.mock("POST", "/hook").expect(0).create();

    let dispatcher = RegistryDispatcher::new(Dispatcher::without_sink(), Duration::from_secs(5));
    let err = dispatcher
        .dispatch(&request(vec![
            format!("json://{host}/hook"),
            "smoke-signal://hill".to_string(),
        ]))
        .unwrap_err();

    assert!(matches!(err, NotifierError::UnsupportedScheme { .. }));
    hook.assert();
}
