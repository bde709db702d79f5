use crate::{backend::ChainBackend, error::ConnectorError};
use aabridge_rpc::{RpcMethod, WalletRequest};
use alloy_primitives::{ChainId, hex};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde_json::{Value, json};

/// The plain wallet of the owner key on one chain.
///
/// Account and signing methods are answered with the owner key itself, everything else goes
/// to the chain's node.
#[derive(Debug)]
pub(crate) struct OwnerWallet<'a> {
    pub signer: &'a PrivateKeySigner,
    pub backend: &'a dyn ChainBackend,
    pub chain_id: ChainId,
}

impl OwnerWallet<'_> {
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        match RpcMethod::from(method) {
            RpcMethod::PersonalSign | RpcMethod::EthSign => {
                let (WalletRequest::PersonalSign { message } | WalletRequest::EthSign { message }) =
                    WalletRequest::parse(method, params)?
                else {
                    return Err(ConnectorError::InvalidParams(format!("{method} expects a message")));
                };
                let signature = self.signer.sign_message_sync(&message)?;
                Ok(json!(hex::encode_prefixed(signature.as_bytes())))
            }
            RpcMethod::Other(other) => match other.as_str() {
                "eth_accounts" | "eth_requestAccounts" => Ok(json!([self.signer.address()])),
                "eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id))),
                _ => self.backend.raw_request(method, params).await,
            },
            _ => self.backend.raw_request(method, params).await,
        }
    }
}
