use crate::error::ConfigError;
use alloy_primitives::ChainId;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A chain the wallet is allowed to operate on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: ChainId,
    #[serde(default)]
    pub name: String,
    pub rpc_url: String,
}

impl ChainConfig {
    pub fn new(id: ChainId, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self { id, name: name.into(), rpc_url: rpc_url.into() }
    }

    /// The chain's transport endpoint.
    pub fn url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.rpc_url)
            .map_err(|source| ConfigError::InvalidRpcUrl { chain: self.id, source })
    }
}

impl fmt::Display for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// The built-in chain allow-list.
pub(crate) fn default_chains() -> Vec<ChainConfig> {
    vec![
        ChainConfig::new(1, "mainnet", "https://eth.llamarpc.com"),
        ChainConfig::new(8453, "base", "https://mainnet.base.org"),
        ChainConfig::new(84532, "base-sepolia", "https://sepolia.base.org"),
    ]
}
