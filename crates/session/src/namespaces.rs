//! Session namespaces.
//!
//! See <https://specs.walletconnect.com/2.0/specs/clients/sign/namespaces>.

use crate::{error::BridgeError, pairing::SessionProposal, switch::parse_caip2};
use aabridge_rpc::RpcMethod;
use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The only namespace the wallet serves.
pub const EIP155: &str = "eip155";

/// Events the wallet emits to sessions.
pub const SUPPORTED_EVENTS: [&str; 2] = ["chainChanged", "accountsChanged"];

pub type ProposeNamespaces = BTreeMap<String, ProposeNamespace>;
pub type SettleNamespaces = BTreeMap<String, SettleNamespace>;

/// What a dApp asks for in one namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeNamespace {
    #[serde(default)]
    pub chains: BTreeSet<String>,
    #[serde(default)]
    pub methods: BTreeSet<String>,
    #[serde(default)]
    pub events: BTreeSet<String>,
}

/// What the wallet grants in one namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleNamespace {
    pub accounts: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    pub events: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub chains: BTreeSet<String>,
}

pub fn supported_methods() -> BTreeSet<String> {
    RpcMethod::SUPPORTED.iter().map(|method| method.as_str().to_string()).collect()
}

/// Builds the namespaces granted for `proposal`.
///
/// Every allowed chain is granted with `account` on it, along with the fixed method and event
/// lists. Fails if the proposal requires a namespace or chain the wallet cannot serve.
pub fn build_approved(
    proposal: &SessionProposal,
    allowed: &[ChainId],
    account: Address,
) -> Result<SettleNamespaces, BridgeError> {
    for (key, namespace) in &proposal.required_namespaces {
        // A key may itself be a chain, e.g. `eip155:1`.
        let (name, key_chain) = match key.split_once(':') {
            Some((name, _)) => (name, Some(key.as_str())),
            None => (key.as_str(), None),
        };
        if name != EIP155 {
            return Err(BridgeError::UnsupportedNamespace(key.clone()));
        }
        for chain in namespace.chains.iter().map(String::as_str).chain(key_chain) {
            match parse_caip2(chain) {
                Some(id) if allowed.contains(&id) => {}
                _ => return Err(BridgeError::UnsupportedChain(chain.to_string())),
            }
        }
    }

    let chains = allowed.iter().map(|id| format!("{EIP155}:{id}")).collect::<BTreeSet<_>>();
    let accounts = chains.iter().map(|chain| format!("{chain}:{account}")).collect();
    let namespace = SettleNamespace {
        accounts,
        methods: supported_methods(),
        events: SUPPORTED_EVENTS.iter().map(|event| event.to_string()).collect(),
        chains,
    };
    Ok(BTreeMap::from([(EIP155.to_string(), namespace)]))
}
