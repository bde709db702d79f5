use aabridge_rpc::{TransactionIntent, TypedDataPayload};
use aabridge_wallets::{ConnectorError, SmartWalletConnector};
use alloy_primitives::{Address, Bytes, ChainId, TxHash, hex};
use async_trait::async_trait;
use serde_json::json;

/// The wallet a session bridge executes approved requests with.
#[async_trait]
pub trait SessionWallet: Send + Sync {
    /// The accounts to expose, connecting first if needed.
    async fn accounts(&self) -> Result<Vec<Address>, ConnectorError>;

    /// The chain the wallet is bound to, `None` while unbound.
    fn chain_id(&self) -> Option<ChainId>;

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ConnectorError>;

    async fn send_transaction(&self, intent: &TransactionIntent) -> Result<TxHash, ConnectorError>;

    /// Signs an EIP-191 message.
    async fn sign_message(&self, message: &Bytes) -> Result<Bytes, ConnectorError>;

    async fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<Bytes, ConnectorError>;
}

#[async_trait]
impl SessionWallet for SmartWalletConnector {
    async fn accounts(&self) -> Result<Vec<Address>, ConnectorError> {
        if !self.is_authorized() {
            let info = self.connect(None).await;
            if !info.is_connected() {
                return Err(ConnectorError::NotConnected);
            }
        }
        self.get_accounts()
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.get_chain_id().ok()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ConnectorError> {
        SmartWalletConnector::switch_chain(self, chain_id).await.map(drop)
    }

    async fn send_transaction(&self, intent: &TransactionIntent) -> Result<TxHash, ConnectorError> {
        SmartWalletConnector::send_transaction(self, intent).await
    }

    // Messages are signed by the owner's plain wallet.
    async fn sign_message(&self, message: &Bytes) -> Result<Bytes, ConnectorError> {
        let params = json!([hex::encode_prefixed(message), self.owner_address()]);
        let signature = self.request("personal_sign", params).await?;
        serde_json::from_value(signature.clone())
            .map_err(|_| ConnectorError::MalformedPayload(format!("invalid signature {signature}")))
    }

    async fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<Bytes, ConnectorError> {
        SmartWalletConnector::sign_typed_data(self, payload).await
    }
}
