//! In-memory chain backends for tests.

use crate::{
    backend::{BackendFactory, ChainBackend},
    error::ConnectorError,
    owner::owner_from_mnemonic,
    user_op::{InclusionReceipt, UserOperation},
};
use aabridge_config::ChainConfig;
use aabridge_rpc::RpcError;
use alloy_primitives::{Address, B256, Bytes, ChainId, TxHash, U256, keccak256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};

/// The first anvil dev account.
pub fn test_owner() -> PrivateKeySigner {
    owner_from_mnemonic("test test test test test test test test test test test junk", None, 0)
        .expect("valid test mnemonic")
}

/// The account address the mock factory reports for `owners` and `nonce`.
pub fn mock_account_address(owners: &[Bytes], nonce: U256) -> Address {
    let mut preimage = owners.iter().flat_map(|owner| owner.to_vec()).collect::<Vec<_>>();
    preimage.extend_from_slice(&nonce.to_be_bytes::<32>());
    Address::from_word(keccak256(preimage))
}

type Submission = (Address, Vec<UserOperation>, Address);

#[derive(Debug, Default)]
struct MockState {
    nonce: U256,
    revert: Option<Bytes>,
    fail_receipts: bool,
    never_include: bool,
    inclusion_delay: Option<Duration>,
    submitted: Vec<Submission>,
    address_queries: Vec<(Address, Vec<Bytes>, U256)>,
    raw_requests: Vec<(String, Value)>,
    raw_responses: HashMap<String, Result<Value, RpcError>>,
}

/// A [`ChainBackend`] that records calls instead of touching a network.
#[derive(Debug)]
pub struct MockBackend {
    chain_id: ChainId,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id, state: Mutex::default() }
    }

    pub fn set_nonce(&self, nonce: U256) {
        self.state.lock().nonce = nonce;
    }

    /// Makes every `handleOps` submission revert with `data`.
    pub fn revert_with(&self, data: impl Into<Bytes>) {
        self.state.lock().revert = Some(data.into());
    }

    /// Reports every included transaction as failed.
    pub fn fail_receipts(&self) {
        self.state.lock().fail_receipts = true;
    }

    /// Never includes submitted transactions.
    pub fn never_include(&self) {
        self.state.lock().never_include = true;
    }

    /// Answers `method` with `response` instead of echoing.
    pub fn respond(&self, method: &str, response: Result<Value, RpcError>) {
        self.state.lock().raw_responses.insert(method.to_string(), response);
    }

    /// Delays every inclusion by `delay`.
    pub fn set_inclusion_delay(&self, delay: Duration) {
        self.state.lock().inclusion_delay = Some(delay);
    }

    pub fn submitted(&self) -> Vec<Submission> {
        self.state.lock().submitted.clone()
    }

    pub fn address_queries(&self) -> Vec<(Address, Vec<Bytes>, U256)> {
        self.state.lock().address_queries.clone()
    }

    pub fn raw_requests(&self) -> Vec<(String, Value)> {
        self.state.lock().raw_requests.clone()
    }

    /// Hash of the most recent submission.
    pub fn last_tx_hash(&self) -> Option<TxHash> {
        self.state.lock().submitted.len().checked_sub(1).map(submission_hash)
    }
}

fn submission_hash(index: usize) -> TxHash {
    B256::left_padding_from(&(index as u64 + 1).to_be_bytes())
}

#[async_trait]
impl ChainBackend for MockBackend {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn account_address(
        &self,
        factory: Address,
        owners: Vec<Bytes>,
        nonce: U256,
    ) -> Result<Address, ConnectorError> {
        let address = mock_account_address(&owners, nonce);
        self.state.lock().address_queries.push((factory, owners, nonce));
        Ok(address)
    }

    async fn entry_point_nonce(
        &self,
        _entry_point: Address,
        _sender: Address,
    ) -> Result<U256, ConnectorError> {
        Ok(self.state.lock().nonce)
    }

    async fn handle_ops(
        &self,
        entry_point: Address,
        ops: Vec<UserOperation>,
        beneficiary: Address,
    ) -> Result<TxHash, ConnectorError> {
        let mut state = self.state.lock();
        state.submitted.push((entry_point, ops, beneficiary));
        if let Some(data) = state.revert.clone() {
            return Err(ConnectorError::reverted(data));
        }
        Ok(submission_hash(state.submitted.len() - 1))
    }

    async fn wait_for_inclusion(
        &self,
        hash: TxHash,
        timeout: Duration,
    ) -> Result<InclusionReceipt, ConnectorError> {
        let (never_include, fail, delay) = {
            let state = self.state.lock();
            (state.never_include, state.fail_receipts, state.inclusion_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if never_include {
            tokio::time::sleep(timeout).await;
            return Err(ConnectorError::InclusionTimeout { hash, timeout });
        }
        Ok(InclusionReceipt { transaction_hash: hash, success: !fail, block_number: Some(1) })
    }

    async fn raw_request(&self, method: &str, params: Value) -> Result<Value, ConnectorError> {
        let mut state = self.state.lock();
        state.raw_requests.push((method.to_string(), params.clone()));
        match state.raw_responses.get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(err)) => Err(ConnectorError::Rpc(err.clone())),
            None => Ok(json!({ "method": method, "params": params })),
        }
    }
}

/// Hands out one shared [`MockBackend`] per chain.
#[derive(Debug, Default)]
pub struct MockBackends {
    backends: Mutex<HashMap<ChainId, Arc<MockBackend>>>,
    connects: Mutex<Vec<ChainId>>,
}

impl MockBackends {
    /// The backend for `chain_id`, created on first use.
    pub fn backend(&self, chain_id: ChainId) -> Arc<MockBackend> {
        self.backends
            .lock()
            .entry(chain_id)
            .or_insert_with(|| Arc::new(MockBackend::new(chain_id)))
            .clone()
    }

    /// Number of backends opened so far.
    pub fn connects(&self) -> usize {
        self.connects.lock().len()
    }

    /// Chains backends were opened for, in order.
    pub fn connected_chains(&self) -> Vec<ChainId> {
        self.connects.lock().clone()
    }
}

impl BackendFactory for MockBackends {
    fn connect(
        &self,
        chain: &ChainConfig,
        _owner: &PrivateKeySigner,
    ) -> Result<Arc<dyn ChainBackend>, ConnectorError> {
        self.connects.lock().push(chain.id);
        Ok(self.backend(chain.id))
    }
}
