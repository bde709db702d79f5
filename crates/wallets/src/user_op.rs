//! ERC-4337 v0.6 user operations.

use crate::{
    account::{ICoinbaseSmartWallet, SmartAccount},
    backend::ChainBackend,
    error::ConnectorError,
};
use aabridge_config::FeePolicy;
use aabridge_rpc::TransactionIntent;
use alloy_primitives::{Address, B256, Bytes, ChainId, TxHash, U256, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolError, SolValue, decode_revert_reason, sol};
use serde::{Deserialize, Serialize};
use std::time::Duration;

sol! {
    #[sol(rpc)]
    interface IEntryPoint {
        struct UserOperation {
            address sender;
            uint256 nonce;
            bytes initCode;
            bytes callData;
            uint256 callGasLimit;
            uint256 verificationGasLimit;
            uint256 preVerificationGas;
            uint256 maxFeePerGas;
            uint256 maxPriorityFeePerGas;
            bytes paymasterAndData;
            bytes signature;
        }

        error FailedOp(uint256 opIndex, string reason);

        function handleOps(UserOperation[] calldata ops, address payable beneficiary) external;

        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}

/// A v0.6 user operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

impl UserOperation {
    /// The operation hash the account validates the signature against.
    ///
    /// Covers every field except the signature, the entry point and the chain id.
    pub fn hash(&self, entry_point: Address, chain_id: ChainId) -> B256 {
        let packed = (
            self.sender,
            self.nonce,
            keccak256(&self.init_code),
            keccak256(&self.call_data),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            keccak256(&self.paymaster_and_data),
        )
            .abi_encode();
        keccak256((keccak256(packed), entry_point, U256::from(chain_id)).abi_encode())
    }

    /// Decodes the account call carried by the operation.
    pub fn decode_call(&self) -> Option<ICoinbaseSmartWallet::executeCall> {
        ICoinbaseSmartWallet::executeCall::abi_decode(&self.call_data).ok()
    }
}

impl From<UserOperation> for IEntryPoint::UserOperation {
    fn from(op: UserOperation) -> Self {
        Self {
            sender: op.sender,
            nonce: op.nonce,
            initCode: op.init_code,
            callData: op.call_data,
            callGasLimit: op.call_gas_limit,
            verificationGasLimit: op.verification_gas_limit,
            preVerificationGas: op.pre_verification_gas,
            maxFeePerGas: op.max_fee_per_gas,
            maxPriorityFeePerGas: op.max_priority_fee_per_gas,
            paymasterAndData: op.paymaster_and_data,
            signature: op.signature,
        }
    }
}

/// Decodes revert data into a short reason.
///
/// Understands the entry point's `FailedOp` as well as `Error(string)` and `Panic(uint256)`.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if let Ok(failed) = IEntryPoint::FailedOp::abi_decode(data) {
        return Some(format!("{} (op {})", failed.reason, failed.opIndex));
    }
    decode_revert_reason(data)
}

/// Result of waiting for a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Turns transaction intents into signed user operations and submits them.
#[derive(Debug)]
pub struct UserOperationBuilder<'a> {
    account: &'a SmartAccount,
    owner: &'a PrivateKeySigner,
    backend: &'a dyn ChainBackend,
    entry_point: Address,
    fees: FeePolicy,
    inclusion_timeout: Duration,
}

impl<'a> UserOperationBuilder<'a> {
    /// Operations go to `entry_point`, carry `fees` and are awaited for at most
    /// `inclusion_timeout`.
    pub fn new(
        account: &'a SmartAccount,
        owner: &'a PrivateKeySigner,
        backend: &'a dyn ChainBackend,
        entry_point: Address,
        fees: FeePolicy,
        inclusion_timeout: Duration,
    ) -> Self {
        Self { account, owner, backend, entry_point, fees, inclusion_timeout }
    }

    /// Builds the unsigned operation for `intent`.
    ///
    /// The account must already be deployed: `initCode` is always empty.
    pub fn build(&self, intent: &TransactionIntent, nonce: U256) -> UserOperation {
        let call_data = ICoinbaseSmartWallet::executeCall {
            target: intent.to,
            value: intent.value,
            data: intent.data.clone(),
        }
        .abi_encode();
        UserOperation {
            sender: self.account.address,
            nonce,
            init_code: Bytes::new(),
            call_data: call_data.into(),
            call_gas_limit: U256::from(self.fees.call_gas_limit),
            verification_gas_limit: U256::from(self.fees.verification_gas_limit),
            pre_verification_gas: U256::from(self.fees.pre_verification_gas),
            max_fee_per_gas: U256::from(self.fees.max_fee_per_gas),
            max_priority_fee_per_gas: U256::from(self.fees.max_priority_fee_per_gas),
            paymaster_and_data: Bytes::new(),
            signature: Bytes::new(),
        }
    }

    /// Signs `op` in place, returning its hash.
    pub fn sign(&self, op: &mut UserOperation) -> Result<B256, ConnectorError> {
        let hash = op.hash(self.entry_point, self.account.chain_id);
        let signature = self.owner.sign_hash_sync(&hash)?;
        op.signature = self.account.wrap_signature(&signature);
        Ok(hash)
    }

    /// Builds, signs and submits one operation for `intent`, then waits for its inclusion.
    ///
    /// Returns the hash of the transaction that included it. The operation is submitted
    /// exactly once.
    pub async fn build_and_submit(
        &self,
        intent: &TransactionIntent,
    ) -> Result<TxHash, ConnectorError> {
        let nonce = self.backend.entry_point_nonce(self.entry_point, self.account.address).await?;
        let mut op = self.build(intent, nonce);
        let op_hash = self.sign(&mut op)?;

        debug!(
            target: "user_op",
            %op_hash, sender = %op.sender, %nonce, to = %intent.to,
            "submitting user operation"
        );
        let tx_hash =
            self.backend.handle_ops(self.entry_point, vec![op], self.account.owner_address).await?;

        let receipt = self.backend.wait_for_inclusion(tx_hash, self.inclusion_timeout).await?;
        if !receipt.success {
            return Err(ConnectorError::ExecutionReverted {
                reason: Some(format!("transaction {tx_hash} reverted")),
                data: None,
            });
        }
        trace!(
            target: "user_op",
            %op_hash, %tx_hash, block = ?receipt.block_number,
            "user operation included"
        );
        Ok(receipt.transaction_hash)
    }
}
