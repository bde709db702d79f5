//! # aabridge-config
//!
//! Configuration for the smart-account session bridge: the chain allow-list, the account
//! abstraction contracts and the fixed user operation fee policy.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, B256, ChainId, address};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

mod chain;
pub use chain::ChainConfig;

pub mod error;
pub use error::{ConfigError, ExtractConfigError};

mod fees;
pub use fees::FeePolicy;

/// Bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain used when a connection does not ask for one.
    pub default_chain: ChainId,
    /// The chains the wallet may operate on. Requests for any other chain are rejected.
    pub chains: Vec<ChainConfig>,
    /// The ERC-4337 (v0.6) entry point contract.
    pub entry_point: Address,
    /// The smart account factory.
    pub account_factory: Address,
    /// Init code hash of the account proxy deployed by the factory.
    ///
    /// When set, account addresses are computed locally; otherwise the factory is queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_init_code_hash: Option<B256>,
    /// The factory salt nonce selecting which account of the owner is used.
    pub account_salt_nonce: u64,
    /// Fixed user operation fees.
    pub fees: FeePolicy,
    /// Seconds to wait for a submitted user operation to be included.
    pub inclusion_timeout: u64,
    /// Milliseconds between receipt polls.
    pub poll_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_chain: 8453,
            chains: chain::default_chains(),
            entry_point: Self::ENTRY_POINT_V06,
            account_factory: Self::COINBASE_SMART_WALLET_FACTORY,
            account_init_code_hash: None,
            account_salt_nonce: 0,
            fees: FeePolicy::default(),
            inclusion_timeout: 120,
            poll_interval: 1_000,
        }
    }
}

impl Config {
    /// The config file looked up in the root directory.
    pub const FILE_NAME: &'static str = "aabridge.toml";

    /// Prefix of the environment variables overriding config values.
    pub const ENV_PREFIX: &'static str = "AABRIDGE_";

    /// The canonical ERC-4337 v0.6 entry point.
    pub const ENTRY_POINT_V06: Address = address!("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

    /// The Coinbase Smart Wallet factory.
    pub const COINBASE_SMART_WALLET_FACTORY: Address =
        address!("0x0BA5ED0c6AA8c49038F819E587E2633c4A9F428a");

    /// Loads the config from the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_root(".")
    }

    /// Loads the config from `root`, layering defaults, `aabridge.toml` and `AABRIDGE_*` env vars.
    pub fn load_with_root(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::try_from(Self::figment_with_root(root))
    }

    /// Attempts to extract and validate a `Config` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        let figment = Figment::from(provider);
        trace!("load config with provider: {:?}", figment.metadata().collect::<Vec<_>>());
        let config = figment.extract::<Self>().map_err(ExtractConfigError::new)?;
        config.validate()?;
        Ok(config)
    }

    /// The default figment rooted at `root`.
    ///
    /// `AABRIDGE_CONFIG` points at an alternative config file. Nested keys use `__` in env
    /// variables, e.g. `AABRIDGE_FEES__MAX_FEE_PER_GAS`.
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        let file = std::env::var_os("AABRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| root.as_ref().join(Self::FILE_NAME));
        Figment::from(Self::default())
            .merge(Toml::file(file))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
    }

    /// Checks the invariants extraction cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chains.is_empty() {
            return Err(ConfigError::NoChains);
        }
        let mut seen = HashSet::with_capacity(self.chains.len());
        for chain in &self.chains {
            if !seen.insert(chain.id) {
                return Err(ConfigError::DuplicateChain(chain.id));
            }
            chain.url()?;
        }
        if !seen.contains(&self.default_chain) {
            return Err(ConfigError::DefaultChainNotListed(self.default_chain));
        }
        Ok(())
    }

    /// Looks up an allowed chain.
    pub fn chain(&self, id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|chain| chain.id == id)
    }

    pub fn is_allowed(&self, id: ChainId) -> bool {
        self.chain(id).is_some()
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chains.iter().map(|chain| chain.id)
    }

    pub fn inclusion_timeout(&self) -> Duration {
        Duration::from_secs(self.inclusion_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("aabridge defaults")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
