use crate::utils::{Harness, proposal};
use aabridge_rpc::ErrorCode;
use aabridge_session::{BridgeError, BridgeEvent};
use similar_asserts::assert_eq;
use std::collections::BTreeSet;

#[tokio::test(flavor = "multi_thread")]
async fn pairs_through_uri() {
    let harness = Harness::new();
    let uri = harness
        .bridge
        .pair("wc:7f6e504bfad60b485450578e05678ed3e8e8c4751d3c6160be17160d63ec90f9@2?relay-protocol=irn&symKey=587d5484ce2a2a6ee3ba1962fdd7e8588e06200c46823bd18fbd67def96ad303")
        .await
        .unwrap();
    assert_eq!(uri.version, 2);
    assert_eq!(*harness.pairing.paired.lock(), vec![uri]);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_uri_is_not_paired() {
    let harness = Harness::new();
    let err = harness.bridge.pair("https://example.com").await.unwrap_err();
    assert!(matches!(err, BridgeError::Pairing(_)), "{err}");
    assert!(harness.pairing.paired.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn approves_with_configured_chains() {
    let mut harness = Harness::new();
    harness.bridge.handle_proposal(proposal(1, &["eip155:8453"]));
    assert!(matches!(
        harness.drain_events().as_slice(),
        [BridgeEvent::ProposalReceived(proposal)] if proposal.id == 1
    ));

    let session = harness.bridge.approve_proposal(1).await.unwrap();
    let account = harness.connector.account().unwrap().address;

    let namespace = &session.namespaces["eip155"];
    let expected = [1u64, 8453, 84532]
        .iter()
        .map(|id| format!("eip155:{id}:{account}"))
        .collect::<BTreeSet<_>>();
    assert_eq!(namespace.accounts, expected);
    assert!(namespace.events.contains("chainChanged"));
    assert!(namespace.events.contains("accountsChanged"));
    assert!(namespace.methods.contains("eth_signTypedData_v3"));

    assert!(harness.bridge.pending_proposals().is_empty());
    assert_eq!(harness.bridge.sessions(), vec![session.clone()]);
    let events = harness.drain_events();
    assert!(
        events
            .iter()
            .any(|event| matches!(event, BridgeEvent::SessionsChanged(s) if s.len() == 1))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_chain_keeps_proposal_pending() {
    let harness = Harness::new();
    harness.bridge.handle_proposal(proposal(3, &["eip155:137"]));

    let err = harness.bridge.approve_proposal(3).await.unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedChain(_)), "{err}");
    assert!(harness.pairing.approved.lock().is_empty());
    assert_eq!(harness.bridge.pending_proposals().len(), 1);

    harness.bridge.reject_proposal(3).await.unwrap();
    assert!(harness.bridge.pending_proposals().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_with_user_rejected() {
    let harness = Harness::new();
    harness.bridge.handle_proposal(proposal(2, &["eip155:1"]));
    harness.bridge.reject_proposal(2).await.unwrap();

    let rejected = harness.pairing.rejected.lock().clone();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].0, 2);
    assert_eq!(rejected[0].1.code, ErrorCode::UserRejected);
    assert!(harness.pairing.approved.lock().is_empty());
    assert!(harness.bridge.sessions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_proposal() {
    let harness = Harness::new();
    assert!(matches!(
        harness.bridge.approve_proposal(9).await,
        Err(BridgeError::UnknownProposal(9))
    ));
    assert!(matches!(
        harness.bridge.reject_proposal(9).await,
        Err(BridgeError::UnknownProposal(9))
    ));
}
