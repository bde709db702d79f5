//! The smart-account connector.
//!
//! Presents the owner's smart account behind a single EIP-1193 style `request` entry point:
//! transaction sends become user operations, typed data is signed by the account and
//! everything else is answered by the owner's plain wallet.

use crate::{
    account::{AccountFactory, BoundAccount, SmartAccount},
    backend::BackendFactory,
    error::ConnectorError,
};
use aabridge_config::{ChainConfig, Config};
use aabridge_rpc::{RpcMethod, TransactionIntent, TypedDataPayload, WalletRequest};
use alloy_primitives::{Address, Bytes, ChainId, TxHash};
use alloy_signer_local::PrivateKeySigner;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

mod state;
use state::ConnectorState;

mod types;
pub use types::{ConnectInfo, ConnectionStatus, ConnectorEvent};

mod wallet;
use wallet::OwnerWallet;

/// Connects an owner key to its smart account on the configured chains.
#[derive(Debug)]
pub struct SmartWalletConnector {
    config: Arc<Config>,
    owner: PrivateKeySigner,
    owner_index: u32,
    account_address: Option<Address>,
    backends: Arc<dyn BackendFactory>,
    state: ConnectorState,
}

impl SmartWalletConnector {
    pub fn new(
        config: Arc<Config>,
        owner: PrivateKeySigner,
        backends: Arc<dyn BackendFactory>,
    ) -> Self {
        Self {
            config,
            owner,
            owner_index: 0,
            account_address: None,
            backends,
            state: ConnectorState::default(),
        }
    }

    /// Sets the owner's slot in the account's owner list.
    pub fn with_owner_index(mut self, owner_index: u32) -> Self {
        self.owner_index = owner_index;
        self
    }

    /// Uses `address` as the smart account instead of deriving it.
    pub fn with_account_address(mut self, address: Option<Address>) -> Self {
        self.account_address = address;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn owner_address(&self) -> Address {
        self.owner.address()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    /// The currently bound account, if any.
    pub fn account(&self) -> Option<SmartAccount> {
        self.state.binding().map(|bound| bound.account)
    }

    pub fn subscribe(&self) -> UnboundedReceiver<ConnectorEvent> {
        self.state.subscribe()
    }

    /// Connects, binding the account to `chain_id` or the default chain.
    ///
    /// An existing binding on another chain is switched. Failures are logged and reported as
    /// a disconnected [`ConnectInfo`].
    pub async fn connect(&self, chain_id: Option<ChainId>) -> ConnectInfo {
        let epoch = self.state.epoch();
        self.state.set_status(ConnectionStatus::Connecting);
        match self.try_connect(chain_id, epoch).await {
            Ok(info) => {
                self.state.set_status(ConnectionStatus::Connected);
                debug!(
                    target: "connector",
                    accounts = ?info.accounts, chain_id = info.chain_id,
                    "connected"
                );
                self.state.notify(ConnectorEvent::Connected(info.clone()));
                info
            }
            Err(err) => {
                warn!(target: "connector", %err, "failed to connect");
                // Requests must not keep running against the previous binding.
                self.state.disconnect();
                ConnectInfo::default()
            }
        }
    }

    async fn try_connect(
        &self,
        chain_id: Option<ChainId>,
        epoch: u64,
    ) -> Result<ConnectInfo, ConnectorError> {
        let mut bound = match self.state.binding() {
            Some(bound) => bound,
            None => self.rebind(chain_id.unwrap_or(self.config.default_chain), epoch).await?,
        };
        if let Some(chain_id) = chain_id
            && bound.chain_id() != chain_id
        {
            bound = self.switch_chain_at(chain_id, epoch).await?;
        }
        if self.state.epoch() != epoch {
            return Err(ConnectorError::NotConnected);
        }
        Ok(ConnectInfo { accounts: vec![bound.account.address], chain_id: bound.chain_id() })
    }

    /// Disconnects. Makes no network calls.
    pub fn disconnect(&self) {
        self.state.disconnect();
        debug!(target: "connector", "disconnected");
        self.state.notify(ConnectorEvent::Disconnected);
    }

    pub fn get_accounts(&self) -> Result<Vec<Address>, ConnectorError> {
        if self.state.status() != ConnectionStatus::Connected {
            return Err(ConnectorError::NotConnected);
        }
        Ok(self.state.binding().map(|bound| vec![bound.account.address]).unwrap_or_default())
    }

    pub fn get_chain_id(&self) -> Result<ChainId, ConnectorError> {
        self.state.binding().map(|bound| bound.chain_id()).ok_or(ConnectorError::NotConnected)
    }

    pub fn is_authorized(&self) -> bool {
        self.get_accounts().map(|accounts| !accounts.is_empty()).unwrap_or(false)
    }

    /// Re-derives the account on `chain_id` and announces the change.
    ///
    /// Fails with [`ConnectorError::NotConnected`] after a disconnect; only [`connect`] binds
    /// again.
    ///
    /// [`connect`]: Self::connect
    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<ChainConfig, ConnectorError> {
        if self.state.status() == ConnectionStatus::Disconnected {
            return Err(ConnectorError::NotConnected);
        }
        let bound = self.switch_chain_at(chain_id, self.state.epoch()).await?;
        Ok(bound.chain.clone())
    }

    async fn switch_chain_at(
        &self,
        chain_id: ChainId,
        epoch: u64,
    ) -> Result<Arc<BoundAccount>, ConnectorError> {
        let bound = self.rebind(chain_id, epoch).await?;
        debug!(target: "connector", chain_id, account = %bound.account.address, "switched chain");
        self.state.notify(ConnectorEvent::ChainChanged(chain_id));
        Ok(bound)
    }

    /// Derives a new binding for `chain_id` once no request is executing.
    async fn rebind(
        &self,
        chain_id: ChainId,
        epoch: u64,
    ) -> Result<Arc<BoundAccount>, ConnectorError> {
        if !self.config.is_allowed(chain_id) {
            return Err(ConnectorError::ChainNotConfigured(chain_id));
        }
        let _gate = self.state.rebinding().await;
        let bound = AccountFactory::new(&self.config, self.backends.as_ref())
            .bind(&self.owner, self.owner_index, chain_id, self.account_address)
            .await?;
        let bound = Arc::new(bound);
        if !self.state.install(bound.clone(), epoch) {
            debug!(target: "connector", chain_id, "discarding binding made before disconnect");
            return Err(ConnectorError::NotConnected);
        }
        Ok(bound)
    }

    /// The binding requests run against.
    fn bound(&self) -> Result<Arc<BoundAccount>, ConnectorError> {
        if self.state.status() == ConnectionStatus::Disconnected {
            return Err(ConnectorError::NotConnected);
        }
        self.state.binding().ok_or(ConnectorError::NotConnected)
    }

    /// Handles a wallet request.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        trace!(target: "connector", %method, %params, "request");
        let result = match RpcMethod::from(method) {
            RpcMethod::EthSendTransaction | RpcMethod::EthSignTypedDataV4 => {
                match WalletRequest::parse(method, params)? {
                    WalletRequest::SendTransaction(intent) => self
                        .send_transaction(&intent)
                        .await
                        .map(|hash| Value::from(hash.to_string())),
                    WalletRequest::SignTypedData { payload, .. } => self
                        .sign_typed_data(&payload)
                        .await
                        .map(|signature| Value::from(signature.to_string())),
                    other => Err(ConnectorError::InvalidParams(format!(
                        "unexpected request {}",
                        other.method()
                    ))),
                }
            }
            _ => self.passthrough(method, params).await,
        };
        match &result {
            Ok(_) => trace!(target: "connector", %method, "request succeeded"),
            Err(err) => debug!(target: "connector", %method, %err, "request failed"),
        }
        result
    }

    /// Sends `intent` from the smart account, returning the inclusion transaction hash.
    pub async fn send_transaction(
        &self,
        intent: &TransactionIntent,
    ) -> Result<TxHash, ConnectorError> {
        let _gate = self.state.execution().await;
        let bound = self.bound()?;
        bound.user_operations(&self.owner, &self.config).build_and_submit(intent).await
    }

    /// Signs typed data as the smart account.
    pub async fn sign_typed_data(
        &self,
        payload: &TypedDataPayload,
    ) -> Result<Bytes, ConnectorError> {
        let _gate = self.state.execution().await;
        let bound = self.bound()?;
        bound.account.sign_typed_data(&self.owner, payload)
    }

    async fn passthrough(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        let _gate = self.state.execution().await;
        let bound = self.bound()?;
        let wallet = OwnerWallet {
            signer: &self.owner,
            backend: bound.backend.as_ref(),
            chain_id: bound.chain_id(),
        };
        wallet.request(method, params).await
    }
}
