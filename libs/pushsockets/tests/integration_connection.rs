//! Integration tests for the push transport lifecycle
//!
//! These tests run a local WebSocket server and verify the four transport
//! events, passive ping handling and close semantics.

mod common;

use common::{next_event, unused_addr, MockPushServer};
use pushsockets::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

fn transport_for(url: String) -> (PushTransportFactory, TransportConfig) {
    let config = TransportConfig::new(url)
        .with_passive_ping(Arc::new(TextPassivePing::new("{}", "{}")))
        .with_connect_timeout(Duration::from_secs(2));
    (PushTransportFactory::new(config.clone()), config)
}

#[tokio::test]
async fn test_connect_send_and_receive() {
    let mut server = MockPushServer::start().await;
    let (factory, _) = transport_for(server.ws_url());
    let (tx, mut rx) = unbounded_channel();

    let transport = factory.create(tx);
    transport.connect();

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);
    assert!(transport.is_connected());

    transport.send(r#"{"connect":{}}"#.to_string());
    assert_eq!(server.next_received().await, r#"{"connect":{}}"#);

    let push = r#"{"push":{"pub":{"data":{"order_id":7,"status":"done"},"offset":1},"channel":"orders"}}"#;
    server.push(push);
    assert_eq!(next_event(&mut rx).await, TransportEvent::Message(push.to_string()));

    verbose_println!("connect/send/receive round trip ok");
    transport.close();
}

#[tokio::test]
async fn test_passive_ping_is_answered_and_swallowed() {
    let mut server = MockPushServer::start().await;
    let (factory, _) = transport_for(server.ws_url());
    let (tx, mut rx) = unbounded_channel();

    let transport = factory.create(tx);
    transport.connect();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);

    server.push("{}");
    assert_eq!(server.next_received().await, "{}");

    // The probe must not surface as a message; the next event is the real frame
    server.push(r#"{"connect":{"client":"abc"}}"#);
    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::Message(r#"{"connect":{"client":"abc"}}"#.to_string())
    );

    transport.close();
}

#[tokio::test]
async fn test_server_close_reports_code_and_reason() {
    let server = MockPushServer::start().await;
    let (factory, _) = transport_for(server.ws_url());
    let (tx, mut rx) = unbounded_channel();

    let transport = factory.create(tx);
    transport.connect();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);

    server.close(4000, "bye");

    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::Closed {
            code: 4000,
            reason: "bye".to_string(),
            clean: true,
        }
    );
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_connect_failure_becomes_error_event() {
    let addr = unused_addr().await;
    let (factory, _) = transport_for(format!("ws://{}", addr));
    let (tx, mut rx) = unbounded_channel();

    let transport = factory.create(tx);
    transport.connect();

    match next_event(&mut rx).await {
        TransportEvent::Error(reason) => assert!(reason.contains("Failed to connect")),
        other => panic!("expected error event, got {:?}", other),
    }
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_close_unregisters_observers() {
    let server = MockPushServer::start().await;
    let (factory, _) = transport_for(server.ws_url());
    let (tx, mut rx) = unbounded_channel();

    let transport = factory.create(tx);
    transport.connect();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);

    transport.close();
    transport.close();

    // No Closed event for a locally requested close, just the end of the channel
    let end = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(end, None);
    assert!(!transport.is_connected());
}
