use super::{BackendFactory, ChainBackend};
use crate::{
    account::ICoinbaseSmartWalletFactory,
    error::ConnectorError,
    user_op::{IEntryPoint, InclusionReceipt, UserOperation},
};
use aabridge_config::ChainConfig;
use aabridge_rpc::{ErrorCode, RpcError};
use alloy_network::{EthereumWallet, ReceiptResponse};
use alloy_primitives::{Address, Bytes, ChainId, TxHash, U256, aliases::U192};
use alloy_provider::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
    WatchTxError,
};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

/// Opens [`HttpBackend`]s.
#[derive(Clone, Debug, Default)]
pub struct HttpBackendFactory {
    poll_interval: Option<Duration>,
}

impl HttpBackendFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often receipts are polled for.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

impl BackendFactory for HttpBackendFactory {
    fn connect(
        &self,
        chain: &ChainConfig,
        owner: &PrivateKeySigner,
    ) -> Result<Arc<dyn ChainBackend>, ConnectorError> {
        let url = chain.url().map_err(|err| ConnectorError::Transport(err.to_string()))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(owner.clone()))
            .connect_http(url)
            .erased();
        if let Some(interval) = self.poll_interval {
            provider.client().set_poll_interval(interval);
        }
        trace!(target: "backend", %chain, "opened http backend");
        Ok(Arc::new(HttpBackend { chain_id: chain.id, provider }))
    }
}

/// A chain backend talking JSON-RPC over HTTP, signing with the owner key.
#[derive(Clone)]
pub struct HttpBackend {
    chain_id: ChainId,
    provider: DynProvider,
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend").field("chain_id", &self.chain_id).finish_non_exhaustive()
    }
}

#[async_trait]
impl ChainBackend for HttpBackend {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn account_address(
        &self,
        factory: Address,
        owners: Vec<Bytes>,
        nonce: U256,
    ) -> Result<Address, ConnectorError> {
        ICoinbaseSmartWalletFactory::new(factory, &self.provider)
            .getAddress(owners, nonce)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn entry_point_nonce(
        &self,
        entry_point: Address,
        sender: Address,
    ) -> Result<U256, ConnectorError> {
        IEntryPoint::new(entry_point, &self.provider)
            .getNonce(sender, U192::ZERO)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn handle_ops(
        &self,
        entry_point: Address,
        ops: Vec<UserOperation>,
        beneficiary: Address,
    ) -> Result<TxHash, ConnectorError> {
        let ops = ops.into_iter().map(Into::into).collect::<Vec<IEntryPoint::UserOperation>>();
        let pending = IEntryPoint::new(entry_point, &self.provider)
            .handleOps(ops, beneficiary)
            .send()
            .await
            .map_err(contract_error)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_inclusion(
        &self,
        hash: TxHash,
        timeout: Duration,
    ) -> Result<InclusionReceipt, ConnectorError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await
            .map_err(|err| match err {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    ConnectorError::InclusionTimeout { hash, timeout }
                }
                PendingTransactionError::TransportError(err) => transport_error(err),
                err => ConnectorError::Transport(err.to_string()),
            })?;
        Ok(InclusionReceipt {
            transaction_hash: receipt.transaction_hash(),
            success: receipt.status(),
            block_number: receipt.block_number(),
        })
    }

    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        self.provider
            .raw_request::<Value, Value>(method.to_string().into(), params)
            .await
            .map_err(transport_error)
    }
}

fn contract_error(err: alloy_contract::Error) -> ConnectorError {
    if let Some(data) = err.as_revert_data() {
        return ConnectorError::reverted(data);
    }
    match err {
        alloy_contract::Error::TransportError(err) => transport_error(err),
        err => ConnectorError::Transport(err.to_string()),
    }
}

/// Keeps node error responses intact so their code and data reach the caller.
fn transport_error(err: TransportError) -> ConnectorError {
    let Some(payload) = err.as_error_resp() else {
        return ConnectorError::Transport(err.to_string());
    };
    if let Some(data) = payload.as_revert_data() {
        return ConnectorError::reverted(data);
    }
    let mut rpc = RpcError::with_message(ErrorCode::from(payload.code), payload.message.to_string());
    rpc.data = payload.data.as_ref().and_then(|data| serde_json::from_str(data.get()).ok());
    ConnectorError::Rpc(rpc)
}
