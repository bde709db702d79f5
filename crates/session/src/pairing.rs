//! The pairing layer the bridge talks through.

use crate::{
    error::PairingError,
    namespaces::{ProposeNamespaces, SettleNamespaces},
};
use aabridge_rpc::{Id, RpcError, RpcResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use url::Url;

/// Peer metadata advertised during pairing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icons: Vec<String>,
}

/// A dApp asking to open a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProposal {
    pub id: u64,
    #[serde(default)]
    pub required_namespaces: ProposeNamespaces,
    #[serde(default)]
    pub optional_namespaces: ProposeNamespaces,
    pub proposer: Metadata,
}

/// A settled session as reported by the pairing layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub topic: String,
    pub namespaces: SettleNamespaces,
    /// Unix timestamp in seconds.
    pub expiry: u64,
    #[serde(default)]
    pub peer: Metadata,
}

/// A request a dApp sent over a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub id: Id,
    pub topic: String,
    /// CAIP-2 chain the dApp issued the request for, e.g. `eip155:8453`.
    pub chain_id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A `wc:<topic>@<version>?<params>` pairing URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairingUri {
    pub topic: String,
    pub version: u32,
    pub relay_protocol: String,
    pub sym_key: String,
    raw: String,
}

impl FromStr for PairingUri {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| PairingError::InvalidUri(format!("{reason}: {s}"));

        let url = Url::parse(s.trim()).map_err(|err| invalid(&err.to_string()))?;
        if url.scheme() != "wc" {
            return Err(invalid("expected the `wc` scheme"));
        }
        let (topic, version) =
            url.path().split_once('@').ok_or_else(|| invalid("missing version"))?;
        if topic.is_empty() || !topic.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("invalid topic"));
        }
        let version = version.parse::<u32>().map_err(|_| invalid("invalid version"))?;

        let mut relay_protocol = None;
        let mut sym_key = None;
        for (key, value) in url.query_pairs() {
            match &*key {
                "relay-protocol" => relay_protocol = Some(value.into_owned()),
                "symKey" => sym_key = Some(value.into_owned()),
                _ => {}
            }
        }
        let sym_key = sym_key.ok_or_else(|| invalid("missing symKey"))?;

        Ok(Self {
            topic: topic.to_string(),
            version,
            relay_protocol: relay_protocol.unwrap_or_else(|| "irn".to_string()),
            sym_key,
            raw: s.trim().to_string(),
        })
    }
}

impl fmt::Display for PairingUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The session protocol client.
///
/// Owns the authoritative set of sessions; the bridge never keeps its own.
#[async_trait]
pub trait PairingClient: Send + Sync {
    async fn pair(&self, uri: &PairingUri) -> Result<(), PairingError>;

    /// Settles the session proposed as `proposal_id` with `namespaces`.
    async fn approve_session(
        &self,
        proposal_id: u64,
        namespaces: SettleNamespaces,
    ) -> Result<ActiveSession, PairingError>;

    async fn reject_session(&self, proposal_id: u64, reason: RpcError) -> Result<(), PairingError>;

    /// Delivers the response to a session request.
    async fn respond(&self, topic: &str, response: RpcResponse) -> Result<(), PairingError>;

    async fn disconnect(&self, topic: &str, reason: RpcError) -> Result<(), PairingError>;

    /// The sessions currently alive.
    async fn active_sessions(&self) -> Result<Vec<ActiveSession>, PairingError>;
}
