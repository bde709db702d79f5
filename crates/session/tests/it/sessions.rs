use crate::utils::{Harness, proposal};
use aabridge_rpc::ErrorCode;
use aabridge_session::{BridgeError, BridgeEvent, PairingError};
use similar_asserts::assert_eq;

async fn with_sessions(ids: &[u64]) -> Harness {
    let harness = Harness::new();
    for &id in ids {
        harness.bridge.handle_proposal(proposal(id, &["eip155:8453"]));
        harness.bridge.approve_proposal(id).await.unwrap();
    }
    harness
}

#[tokio::test(flavor = "multi_thread")]
async fn disconnect_uses_user_disconnected() {
    let harness = with_sessions(&[1, 2]).await;
    assert_eq!(harness.bridge.sessions().len(), 2);

    let remaining = harness.bridge.disconnect_session("topic-1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].topic, "topic-2");
    assert_eq!(harness.bridge.sessions(), remaining);

    let disconnected = harness.pairing.disconnected.lock().clone();
    assert_eq!(disconnected.len(), 1);
    assert_eq!(disconnected[0].0, "topic-1");
    assert_eq!(disconnected[0].1.code, ErrorCode::UserDisconnected);
    assert_eq!(disconnected[0].1.code.code(), 6000);
}

#[tokio::test(flavor = "multi_thread")]
async fn disconnecting_unknown_topic_fails() {
    let harness = with_sessions(&[1]).await;
    let err = harness.bridge.disconnect_session("nope").await.unwrap_err();
    assert!(matches!(err, BridgeError::Pairing(PairingError::UnknownTopic(_))), "{err}");
    assert_eq!(harness.bridge.sessions().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_deletion_is_read_back_from_pairing() {
    let mut harness = with_sessions(&[1, 2]).await;
    harness.drain_events();

    harness.pairing.drop_session("topic-2");
    // Not observed until the pairing layer reports it.
    assert_eq!(harness.bridge.sessions().len(), 2);

    let reads = harness.pairing.active_session_reads();
    let sessions = harness.bridge.on_session_deleted("topic-2").await.unwrap();
    assert_eq!(harness.pairing.active_session_reads(), reads + 1);
    assert_eq!(sessions.len(), 1);
    assert_eq!(harness.bridge.sessions(), sessions);
    assert_eq!(harness.drain_events(), vec![BridgeEvent::SessionsChanged(sessions)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn expiry_is_read_back_from_pairing() {
    let harness = with_sessions(&[1]).await;
    harness.pairing.drop_session("topic-1");
    assert!(harness.bridge.on_session_expired("topic-1").await.unwrap().is_empty());
    assert!(harness.bridge.sessions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn events_for_unknown_topics_still_refresh() {
    let harness = with_sessions(&[1]).await;
    let sessions = harness.bridge.on_session_deleted("unknown").await.unwrap();
    assert_eq!(sessions.len(), 1);
}
