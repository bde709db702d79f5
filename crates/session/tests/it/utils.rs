//! Test harness: an in-memory pairing client in front of a connector on mock chains.

use aabridge_config::Config;
use aabridge_rpc::{RpcError, RpcResponse};
use aabridge_session::{
    ActiveSession, BridgeEvent, Metadata, PairingClient, PairingError, PairingUri, ProposeNamespace,
    SessionBridge, SessionProposal, SessionRequest, SettleNamespaces,
};
use aabridge_wallets::{
    SmartWalletConnector,
    test_utils::{MockBackend, MockBackends, test_owner},
};
use alloy_primitives::ChainId;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::mpsc::UnboundedReceiver;

/// A pairing client that records every call and keeps sessions in memory.
#[derive(Debug, Default)]
pub struct MockPairing {
    pub paired: Mutex<Vec<PairingUri>>,
    pub approved: Mutex<Vec<(u64, SettleNamespaces)>>,
    pub rejected: Mutex<Vec<(u64, RpcError)>>,
    pub responses: Mutex<Vec<(String, RpcResponse)>>,
    pub disconnected: Mutex<Vec<(String, RpcError)>>,
    sessions: Mutex<Vec<ActiveSession>>,
    active_session_reads: Mutex<usize>,
}

impl MockPairing {
    /// Drops `topic` as if the peer or the relay ended it.
    pub fn drop_session(&self, topic: &str) {
        self.sessions.lock().retain(|session| session.topic != topic);
    }

    pub fn responses(&self) -> Vec<RpcResponse> {
        self.responses.lock().iter().map(|(_, response)| response.clone()).collect()
    }

    pub fn active_session_reads(&self) -> usize {
        *self.active_session_reads.lock()
    }
}

#[async_trait]
impl PairingClient for MockPairing {
    async fn pair(&self, uri: &PairingUri) -> Result<(), PairingError> {
        self.paired.lock().push(uri.clone());
        Ok(())
    }

    async fn approve_session(
        &self,
        proposal_id: u64,
        namespaces: SettleNamespaces,
    ) -> Result<ActiveSession, PairingError> {
        self.approved.lock().push((proposal_id, namespaces.clone()));
        let session = ActiveSession {
            topic: format!("topic-{proposal_id}"),
            namespaces,
            expiry: 1_700_000_000,
            peer: metadata(),
        };
        self.sessions.lock().push(session.clone());
        Ok(session)
    }

    async fn reject_session(&self, proposal_id: u64, reason: RpcError) -> Result<(), PairingError> {
        self.rejected.lock().push((proposal_id, reason));
        Ok(())
    }

    async fn respond(&self, topic: &str, response: RpcResponse) -> Result<(), PairingError> {
        self.responses.lock().push((topic.to_string(), response));
        Ok(())
    }

    async fn disconnect(&self, topic: &str, reason: RpcError) -> Result<(), PairingError> {
        let mut sessions = self.sessions.lock();
        if !sessions.iter().any(|session| session.topic == topic) {
            return Err(PairingError::UnknownTopic(topic.to_string()));
        }
        sessions.retain(|session| session.topic != topic);
        self.disconnected.lock().push((topic.to_string(), reason));
        Ok(())
    }

    async fn active_sessions(&self) -> Result<Vec<ActiveSession>, PairingError> {
        *self.active_session_reads.lock() += 1;
        Ok(self.sessions.lock().clone())
    }
}

pub fn metadata() -> Metadata {
    Metadata {
        name: "Example dApp".into(),
        description: "An example dApp".into(),
        url: "https://example.com".into(),
        icons: vec![],
    }
}

pub fn proposal(id: u64, chains: &[&str]) -> SessionProposal {
    let namespace = ProposeNamespace {
        chains: chains.iter().map(|chain| chain.to_string()).collect(),
        methods: ["eth_sendTransaction", "personal_sign"].map(String::from).into(),
        events: ["chainChanged", "accountsChanged"].map(String::from).into(),
    };
    SessionProposal {
        id,
        required_namespaces: BTreeMap::from([("eip155".to_string(), namespace)]),
        optional_namespaces: BTreeMap::new(),
        proposer: metadata(),
    }
}

pub fn request(id: u64, chain: &str, method: &str, params: Value) -> SessionRequest {
    SessionRequest {
        id: id.into(),
        topic: "topic-1".into(),
        chain_id: chain.into(),
        method: method.into(),
        params,
    }
}

/// A bridge wired to a real connector over mock chains.
pub struct Harness {
    pub bridge: Arc<SessionBridge>,
    pub pairing: Arc<MockPairing>,
    pub connector: Arc<SmartWalletConnector>,
    pub backends: Arc<MockBackends>,
    pub events: UnboundedReceiver<BridgeEvent>,
}

impl Harness {
    pub fn new() -> Self {
        crate::init_tracing();
        let config = Arc::new(Config::default());
        let backends = Arc::new(MockBackends::default());
        let connector =
            Arc::new(SmartWalletConnector::new(config.clone(), test_owner(), backends.clone()));
        let pairing = Arc::new(MockPairing::default());
        let bridge = Arc::new(SessionBridge::new(pairing.clone(), connector.clone(), config));
        let events = bridge.subscribe();
        Self { bridge, pairing, connector, backends, events }
    }

    /// A harness whose wallet is already connected on `chain_id`.
    pub async fn connected(chain_id: ChainId) -> Self {
        let harness = Self::new();
        let info = harness.connector.connect(Some(chain_id)).await;
        assert!(info.is_connected());
        harness
    }

    pub fn backend(&self, chain_id: ChainId) -> Arc<MockBackend> {
        self.backends.backend(chain_id)
    }

    /// Events emitted so far.
    pub fn drain_events(&mut self) -> Vec<BridgeEvent> {
        let mut events = vec![];
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
