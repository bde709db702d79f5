use crate::utils::{Harness, request};
use aabridge_rpc::{ErrorCode, ResponseResult};
use aabridge_session::{BridgeError, BridgeEvent};
use alloy_primitives::Address;
use serde_json::json;
use similar_asserts::assert_eq;
use std::time::Duration;

fn send_request(id: u64) -> aabridge_session::SessionRequest {
    request(id, "eip155:8453", "eth_sendTransaction", json!([{ "to": Address::ZERO }]))
}

#[tokio::test(flavor = "multi_thread")]
async fn holds_one_request_at_a_time() {
    let mut harness = Harness::connected(8453).await;
    harness.drain_events();

    harness.bridge.set_current(send_request(1)).unwrap();
    assert!(matches!(
        harness.bridge.set_current(send_request(2)),
        Err(BridgeError::RequestInProgress)
    ));
    assert_eq!(harness.bridge.current(), Some(send_request(1)));
    assert_eq!(harness.drain_events(), vec![BridgeEvent::RequestReceived(send_request(1))]);

    let response = harness.bridge.resolve_current(true).await.unwrap();
    assert!(response.result.is_success());
    assert_eq!(harness.bridge.current(), None);
    assert_eq!(harness.pairing.responses(), vec![response]);

    harness.bridge.set_current(send_request(2)).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn resolving_with_rejection() {
    let harness = Harness::connected(8453).await;
    harness.bridge.set_current(send_request(1)).unwrap();

    let response = harness.bridge.resolve_current(false).await.unwrap();
    assert_eq!(response.result.as_error().unwrap().code, ErrorCode::UserRejected);
    assert!(harness.backend(8453).submitted().is_empty());
    assert_eq!(harness.bridge.current(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn nothing_to_resolve_or_cancel() {
    let harness = Harness::new();
    assert!(matches!(
        harness.bridge.resolve_current(true).await,
        Err(BridgeError::NoCurrentRequest)
    ));
    assert!(matches!(harness.bridge.cancel_current().await, Err(BridgeError::NoCurrentRequest)));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_pending_request_rejects_it() {
    let harness = Harness::connected(8453).await;
    harness.bridge.set_current(send_request(4)).unwrap();

    harness.bridge.cancel_current().await.unwrap();

    let responses = harness.pairing.responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].id, 4u64.into());
    assert_eq!(responses[0].result.as_error().unwrap().code, ErrorCode::UserRejected);
    assert_eq!(harness.bridge.current(), None);
    assert!(harness.backend(8453).submitted().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_executing_request_defers_rejection() {
    let mut harness = Harness::connected(8453).await;
    let backend = harness.backend(8453);
    backend.set_inclusion_delay(Duration::from_millis(300));
    harness.bridge.set_current(send_request(5)).unwrap();
    harness.drain_events();

    let bridge = harness.bridge.clone();
    let resolving = tokio::spawn(async move { bridge.resolve_current(true).await });
    while backend.submitted().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    harness.bridge.cancel_current().await.unwrap();
    assert_eq!(harness.drain_events(), vec![BridgeEvent::CancellationDeferred(5u64.into())]);
    assert!(harness.pairing.responses().is_empty());
    assert!(matches!(
        harness.bridge.resolve_current(true).await,
        Err(BridgeError::RequestInProgress)
    ));

    let response = resolving.await.unwrap().unwrap();
    assert!(matches!(
        &response.result,
        ResponseResult::Error(err) if err.code == ErrorCode::UserRejected
    ));
    assert_eq!(harness.pairing.responses(), vec![response]);
    assert_eq!(backend.submitted().len(), 1);
    assert_eq!(harness.bridge.current(), None);
}
