//! Smart account derivation and signing.

use crate::{
    backend::{BackendFactory, ChainBackend},
    error::ConnectorError,
    user_op::UserOperationBuilder,
};
use aabridge_config::{ChainConfig, Config};
use aabridge_rpc::TypedDataPayload;
use alloy_primitives::{Address, B256, Bytes, ChainId, U256, eip191_hash_message, keccak256};
use alloy_signer::{Signature, SignerSync};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolStruct, SolValue, eip712_domain, sol};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

sol! {
    #[sol(rpc)]
    interface ICoinbaseSmartWalletFactory {
        function getAddress(bytes[] calldata owners, uint256 nonce) external view returns (address);
    }

    interface ICoinbaseSmartWallet {
        function execute(address target, uint256 value, bytes calldata data) external payable;
    }

    struct SignatureWrapper {
        uint256 ownerIndex;
        bytes signatureData;
    }

    struct CoinbaseSmartWalletMessage {
        bytes32 hash;
    }
}

/// A smart account controlled by a single owner key on one chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAccount {
    pub address: Address,
    pub owner_address: Address,
    pub owner_index: u32,
    pub chain_id: ChainId,
}

impl SmartAccount {
    /// Encodes the owner the way the account stores it.
    pub fn owner_bytes(owner: Address) -> Bytes {
        owner.abi_encode().into()
    }

    /// Hash the account asks its owners to sign for ERC-1271 checks.
    ///
    /// Binds `hash` to this account and chain so one signature cannot be replayed on another
    /// account of the same owner.
    pub fn replay_safe_hash(&self, hash: B256) -> B256 {
        let domain = eip712_domain! {
            name: "Coinbase Smart Wallet",
            version: "1",
            chain_id: self.chain_id,
            verifying_contract: self.address,
        };
        CoinbaseSmartWalletMessage { hash }.eip712_signing_hash(&domain)
    }

    /// Wraps an owner signature with the owner index.
    pub fn wrap_signature(&self, signature: &Signature) -> Bytes {
        SignatureWrapper {
            ownerIndex: U256::from(self.owner_index),
            signatureData: Bytes::copy_from_slice(&signature.as_bytes()),
        }
        .abi_encode()
        .into()
    }

    /// Signs `hash` as the account, for verification through `isValidSignature`.
    pub fn sign_hash(&self, owner: &PrivateKeySigner, hash: B256) -> Result<Bytes, ConnectorError> {
        let signature = owner.sign_hash_sync(&self.replay_safe_hash(hash))?;
        Ok(self.wrap_signature(&signature))
    }

    /// Signs typed data as the account.
    ///
    /// Text that is not valid typed data is signed as an EIP-191 personal message.
    pub fn sign_typed_data(
        &self,
        owner: &PrivateKeySigner,
        payload: &TypedDataPayload,
    ) -> Result<Bytes, ConnectorError> {
        let hash = match payload {
            TypedDataPayload::Structured(typed_data) => typed_data
                .eip712_signing_hash()
                .map_err(|err| ConnectorError::MalformedPayload(err.to_string()))?,
            TypedDataPayload::Raw(text) => eip191_hash_message(text.as_bytes()),
        };
        self.sign_hash(owner, hash)
    }
}

impl fmt::Display for SmartAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (owner {} #{}, chain {})",
            self.address, self.owner_address, self.owner_index, self.chain_id
        )
    }
}

/// The factory salt for an owner set.
pub fn account_salt(owners: &[Bytes], nonce: U256) -> B256 {
    keccak256((owners.to_vec(), nonce).abi_encode_params())
}

/// The CREATE2 address the factory deploys the account at.
pub fn counterfactual_address(
    factory: Address,
    owners: &[Bytes],
    nonce: U256,
    init_code_hash: B256,
) -> Address {
    factory.create2(account_salt(owners, nonce), init_code_hash)
}

/// A smart account together with the chain it is bound to.
#[derive(Debug)]
pub struct BoundAccount {
    pub account: SmartAccount,
    pub chain: ChainConfig,
    pub backend: Arc<dyn ChainBackend>,
}

impl BoundAccount {
    pub fn chain_id(&self) -> ChainId {
        self.chain.id
    }

    /// A builder submitting operations for this account.
    pub fn user_operations<'a>(
        &'a self,
        owner: &'a PrivateKeySigner,
        config: &Config,
    ) -> UserOperationBuilder<'a> {
        UserOperationBuilder::new(
            &self.account,
            owner,
            self.backend.as_ref(),
            config.entry_point,
            config.fees,
            config.inclusion_timeout(),
        )
    }
}

/// Derives smart accounts and binds them to chain backends.
#[derive(Debug)]
pub struct AccountFactory<'a> {
    config: &'a Config,
    backends: &'a dyn BackendFactory,
}

impl<'a> AccountFactory<'a> {
    pub fn new(config: &'a Config, backends: &'a dyn BackendFactory) -> Self {
        Self { config, backends }
    }

    /// Binds the owner's account on `chain_id`.
    ///
    /// An explicit `address` is used verbatim; otherwise the counterfactual address is derived.
    /// Only reads from the chain.
    pub async fn bind(
        &self,
        owner: &PrivateKeySigner,
        owner_index: u32,
        chain_id: ChainId,
        address: Option<Address>,
    ) -> Result<BoundAccount, ConnectorError> {
        let chain = self
            .config
            .chain(chain_id)
            .cloned()
            .ok_or(ConnectorError::ChainNotConfigured(chain_id))?;
        let backend = self.backends.connect(&chain, owner)?;

        let owner_address = owner.address();
        let address = match address {
            Some(address) => address,
            None => {
                let owners = vec![SmartAccount::owner_bytes(owner_address)];
                let nonce = U256::from(self.config.account_salt_nonce);
                match self.config.account_init_code_hash {
                    Some(init_code_hash) => counterfactual_address(
                        self.config.account_factory,
                        &owners,
                        nonce,
                        init_code_hash,
                    ),
                    None => {
                        backend.account_address(self.config.account_factory, owners, nonce).await?
                    }
                }
            }
        };

        let account = SmartAccount { address, owner_address, owner_index, chain_id };
        debug!(target: "account", %account, "bound smart account");
        Ok(BoundAccount { account, chain, backend })
    }
}
