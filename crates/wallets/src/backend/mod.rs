//! Chain access used by the connector.

use crate::{
    error::ConnectorError,
    user_op::{InclusionReceipt, UserOperation},
};
use aabridge_config::ChainConfig;
use alloy_primitives::{Address, Bytes, ChainId, TxHash, U256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

mod http;
pub use http::{HttpBackend, HttpBackendFactory};

/// Everything the wallet needs from one chain.
#[async_trait]
pub trait ChainBackend: Send + Sync + fmt::Debug {
    fn chain_id(&self) -> ChainId;

    /// Reads the counterfactual account address from the account factory.
    async fn account_address(
        &self,
        factory: Address,
        owners: Vec<Bytes>,
        nonce: U256,
    ) -> Result<Address, ConnectorError>;

    /// The entry point nonce of `sender` under key 0.
    async fn entry_point_nonce(
        &self,
        entry_point: Address,
        sender: Address,
    ) -> Result<U256, ConnectorError>;

    /// Sends `handleOps(ops, beneficiary)` from the owner, returning the transaction hash.
    async fn handle_ops(
        &self,
        entry_point: Address,
        ops: Vec<UserOperation>,
        beneficiary: Address,
    ) -> Result<TxHash, ConnectorError>;

    /// Waits until `hash` is included, failing with [`ConnectorError::InclusionTimeout`] once
    /// `timeout` elapses.
    async fn wait_for_inclusion(
        &self,
        hash: TxHash,
        timeout: Duration,
    ) -> Result<InclusionReceipt, ConnectorError>;

    /// Forwards a JSON-RPC call to the chain's node unchanged.
    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ConnectorError>;
}

/// Opens backends for configured chains.
pub trait BackendFactory: Send + Sync + fmt::Debug {
    /// Opens a backend for `chain` whose transactions are signed by `owner`.
    fn connect(
        &self,
        chain: &ChainConfig,
        owner: &PrivateKeySigner,
    ) -> Result<Arc<dyn ChainBackend>, ConnectorError>;
}
