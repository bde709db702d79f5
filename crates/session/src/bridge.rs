//! The session bridge.
//!
//! Sits between a session-protocol client and a [`SessionWallet`]: it answers pairing proposals,
//! runs approved requests against the wallet and reports every outcome back to the peer as a
//! JSON-RPC response. The set of active sessions is owned by the pairing layer and only ever
//! re-read from it.

use crate::{
    error::BridgeError,
    namespaces::build_approved,
    pairing::{ActiveSession, PairingClient, PairingUri, SessionProposal, SessionRequest},
    switch::chain_switch_intent,
    wallet::SessionWallet,
};
use aabridge_config::Config;
use aabridge_rpc::{Id, RpcError, RpcResponse, WalletRequest};
use aabridge_wallets::ConnectorError;
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// The result reported for methods the wallet does not handle.
pub const UNRECOGNIZED_RESULT: &str = "0x";

/// Something the embedding application may want to act on.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeEvent {
    /// A dApp proposed a session; approve or reject it by id.
    ProposalReceived(SessionProposal),
    /// A request became the current request.
    RequestReceived(SessionRequest),
    /// A dApp asked to add a chain. Nothing is changed.
    ChainAddRequested(Value),
    SessionsChanged(Vec<ActiveSession>),
    /// The current request was cancelled while executing and will be rejected once it settles.
    CancellationDeferred(Id),
}

#[derive(Debug)]
struct CurrentRequest {
    request: SessionRequest,
    executing: bool,
    cancelled: bool,
}

/// Bridges session requests to a wallet.
pub struct SessionBridge {
    pairing: Arc<dyn PairingClient>,
    wallet: Arc<dyn SessionWallet>,
    config: Arc<Config>,
    proposals: Mutex<HashMap<u64, SessionProposal>>,
    sessions: Mutex<Vec<ActiveSession>>,
    current: Mutex<Option<CurrentRequest>>,
    listeners: Mutex<Vec<UnboundedSender<BridgeEvent>>>,
}

impl fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBridge")
            .field("proposals", &self.proposals.lock().len())
            .field("sessions", &self.sessions.lock().len())
            .field("current", &*self.current.lock())
            .finish_non_exhaustive()
    }
}

impl SessionBridge {
    pub fn new(
        pairing: Arc<dyn PairingClient>,
        wallet: Arc<dyn SessionWallet>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            pairing,
            wallet,
            config,
            proposals: Default::default(),
            sessions: Default::default(),
            current: Default::default(),
            listeners: Default::default(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<BridgeEvent> {
        let (tx, rx) = unbounded_channel();
        self.listeners.lock().push(tx);
        rx
    }

    fn notify(&self, event: BridgeEvent) {
        self.listeners.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Pairs with a dApp through a `wc:` URI.
    pub async fn pair(&self, uri: &str) -> Result<PairingUri, BridgeError> {
        let uri = uri.parse::<PairingUri>()?;
        debug!(target: "bridge", topic = %uri.topic, version = uri.version, "pairing");
        self.pairing.pair(&uri).await?;
        Ok(uri)
    }

    /// Records an incoming proposal until it is approved or rejected.
    pub fn handle_proposal(&self, proposal: SessionProposal) {
        debug!(
            target: "bridge",
            id = proposal.id, proposer = %proposal.proposer.name,
            "session proposal"
        );
        self.proposals.lock().insert(proposal.id, proposal.clone());
        self.notify(BridgeEvent::ProposalReceived(proposal));
    }

    pub fn pending_proposals(&self) -> Vec<SessionProposal> {
        let mut proposals = self.proposals.lock().values().cloned().collect::<Vec<_>>();
        proposals.sort_by_key(|proposal| proposal.id);
        proposals
    }

    /// Approves proposal `id`, exposing the wallet's account on every configured chain.
    ///
    /// A proposal that cannot be served stays pending so it can still be rejected.
    pub async fn approve_proposal(&self, id: u64) -> Result<ActiveSession, BridgeError> {
        let proposal =
            self.proposals.lock().get(&id).cloned().ok_or(BridgeError::UnknownProposal(id))?;
        let accounts = self.wallet.accounts().await?;
        let account = accounts.first().copied().ok_or(BridgeError::NoAccount)?;
        let chains = self.config.chain_ids().collect::<Vec<_>>();
        let namespaces = build_approved(&proposal, &chains, account)?;

        let session = self.pairing.approve_session(id, namespaces).await?;
        self.proposals.lock().remove(&id);
        debug!(target: "bridge", id, topic = %session.topic, %account, "session approved");
        self.refresh().await?;
        Ok(session)
    }

    pub async fn reject_proposal(&self, id: u64) -> Result<(), BridgeError> {
        self.proposals.lock().remove(&id).ok_or(BridgeError::UnknownProposal(id))?;
        debug!(target: "bridge", id, "session rejected");
        self.pairing.reject_session(id, RpcError::user_rejected()).await?;
        Ok(())
    }

    /// Runs `request` if approved and sends the response to the peer.
    ///
    /// Every request is answered: a rejection with 4001 and a failure with its classified
    /// error. Only failing to deliver the response is an error.
    pub async fn handle_request(
        &self,
        request: &SessionRequest,
        approve: bool,
    ) -> Result<RpcResponse, BridgeError> {
        let response = self.execute(request, approve).await;
        self.respond(request, response).await
    }

    /// Runs `request` if approved, returning the response without sending it.
    pub async fn execute(&self, request: &SessionRequest, approve: bool) -> RpcResponse {
        if !approve {
            debug!(
                target: "bridge",
                id = %request.id, method = %request.method,
                "request rejected"
            );
            return RpcResponse::rejected(request.id.clone());
        }
        trace!(
            target: "bridge",
            id = %request.id, method = %request.method, chain = %request.chain_id,
            "executing request"
        );
        match self.run(request).await {
            Ok(result) => {
                trace!(target: "bridge", id = %request.id, "request succeeded");
                RpcResponse::success(request.id.clone(), result)
            }
            Err(err) => {
                let summary = err.summary();
                debug!(
                    target: "bridge",
                    id = %request.id, method = %request.method, %summary,
                    "request failed"
                );
                RpcResponse::new(request.id.clone(), summary.to_rpc_error())
            }
        }
    }

    async fn run(&self, request: &SessionRequest) -> Result<Value, BridgeError> {
        let active = self.wallet.chain_id();
        let intent = chain_switch_intent(request, active)
            .ok_or_else(|| BridgeError::UnsupportedChain(request.chain_id.clone()))?;
        if intent.required {
            // Switching would bind an account the user disconnected.
            if active.is_none() {
                return Err(ConnectorError::NotConnected.into());
            }
            debug!(
                target: "bridge",
                chain_id = intent.target_chain_id, method = %request.method,
                "switching chain for request"
            );
            self.wallet.switch_chain(intent.target_chain_id).await?;
        }

        let parsed = WalletRequest::parse(&request.method, request.params.clone())
            .map_err(ConnectorError::from)?;
        let result: Value = match parsed {
            WalletRequest::SendTransaction(tx) => {
                self.wallet.send_transaction(&tx).await?.to_string().into()
            }
            WalletRequest::PersonalSign { message } | WalletRequest::EthSign { message } => {
                self.wallet.sign_message(&message).await?.to_string().into()
            }
            WalletRequest::SignTypedData { payload, .. } => {
                self.wallet.sign_typed_data(&payload).await?.to_string().into()
            }
            WalletRequest::SwitchChain { chain_id } => {
                if !self.config.is_allowed(chain_id) {
                    return Err(ConnectorError::ChainNotConfigured(chain_id).into());
                }
                if self.wallet.chain_id() != Some(chain_id) {
                    self.wallet.switch_chain(chain_id).await?;
                }
                Value::Null
            }
            WalletRequest::AddChain(params) => {
                self.notify(BridgeEvent::ChainAddRequested(params));
                Value::Null
            }
            WalletRequest::Other { method, .. } => {
                debug!(target: "bridge", %method, "unrecognized method");
                UNRECOGNIZED_RESULT.into()
            }
        };
        Ok(result)
    }

    async fn respond(
        &self,
        request: &SessionRequest,
        response: RpcResponse,
    ) -> Result<RpcResponse, BridgeError> {
        self.pairing.respond(&request.topic, response.clone()).await?;
        Ok(response)
    }

    /// Makes `request` the current request, awaiting a decision.
    pub fn set_current(&self, request: SessionRequest) -> Result<(), BridgeError> {
        {
            let mut slot = self.current.lock();
            if slot.is_some() {
                return Err(BridgeError::RequestInProgress);
            }
            *slot = Some(CurrentRequest {
                request: request.clone(),
                executing: false,
                cancelled: false,
            });
        }
        self.notify(BridgeEvent::RequestReceived(request));
        Ok(())
    }

    pub fn current(&self) -> Option<SessionRequest> {
        self.current.lock().as_ref().map(|current| current.request.clone())
    }

    /// Decides the current request and answers it.
    ///
    /// If the request is cancelled while executing, it is answered with 4001 once it settles.
    pub async fn resolve_current(&self, approve: bool) -> Result<RpcResponse, BridgeError> {
        let request = {
            let mut slot = self.current.lock();
            let current = slot.as_mut().ok_or(BridgeError::NoCurrentRequest)?;
            if current.executing {
                return Err(BridgeError::RequestInProgress);
            }
            current.executing = true;
            current.request.clone()
        };

        let mut response = self.execute(&request, approve).await;
        let cancelled = self.current.lock().take().is_some_and(|current| current.cancelled);
        if cancelled {
            debug!(target: "bridge", id = %request.id, "answering cancelled request");
            response = RpcResponse::rejected(request.id.clone());
        }
        self.respond(&request, response).await
    }

    /// Cancels the current request.
    ///
    /// A pending request is rejected right away; an executing one is rejected when it settles.
    pub async fn cancel_current(&self) -> Result<(), BridgeError> {
        let (request, executing) = {
            let mut slot = self.current.lock();
            let current = slot.as_mut().ok_or(BridgeError::NoCurrentRequest)?;
            current.cancelled = true;
            let executing = current.executing;
            let request = current.request.clone();
            if !executing {
                slot.take();
            }
            (request, executing)
        };

        if executing {
            warn!(
                target: "bridge",
                id = %request.id, method = %request.method,
                "request is executing; it will be rejected once it settles"
            );
            self.notify(BridgeEvent::CancellationDeferred(request.id));
            return Ok(());
        }
        self.respond(&request, RpcResponse::rejected(request.id.clone())).await?;
        Ok(())
    }

    /// Ends the session on `topic`.
    pub async fn disconnect_session(
        &self,
        topic: &str,
    ) -> Result<Vec<ActiveSession>, BridgeError> {
        debug!(target: "bridge", %topic, "disconnecting session");
        self.pairing.disconnect(topic, RpcError::user_disconnected()).await?;
        self.refresh().await
    }

    pub async fn on_session_deleted(&self, topic: &str) -> Result<Vec<ActiveSession>, BridgeError> {
        debug!(target: "bridge", %topic, "session deleted by peer");
        self.refresh().await
    }

    pub async fn on_session_expired(&self, topic: &str) -> Result<Vec<ActiveSession>, BridgeError> {
        debug!(target: "bridge", %topic, "session expired");
        self.refresh().await
    }

    /// Re-reads the active sessions from the pairing layer.
    pub async fn refresh(&self) -> Result<Vec<ActiveSession>, BridgeError> {
        let sessions = self.pairing.active_sessions().await?;
        *self.sessions.lock() = sessions.clone();
        self.notify(BridgeEvent::SessionsChanged(sessions.clone()));
        Ok(sessions)
    }

    /// The sessions as of the last refresh.
    pub fn sessions(&self) -> Vec<ActiveSession> {
        self.sessions.lock().clone()
    }
}
