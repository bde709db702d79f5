//! Configuration errors
use alloy_primitives::ChainId;
use figment::providers::{Format, Toml};
use std::{collections::HashSet, error::Error, fmt};

/// The message shown if the config could not be extracted from the figment
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract aabridge config:";

/// Represents a failed attempt to extract `Config` from a `Figment`
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    /// error thrown when extracting the `Config`
    pub(crate) error: figment::Error,
}

impl ExtractConfigError {
    /// Wraps the figment error
    pub fn new(error: figment::Error) -> Self {
        Self { error }
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut unique_errors = Vec::with_capacity(self.error.count());
        let mut unique = HashSet::with_capacity(self.error.count());
        for err in self.error.clone() {
            let from_toml = err
                .metadata
                .as_ref()
                .map(|meta| meta.name.contains(Toml::NAME))
                .unwrap_or_default();
            let mut rendered = if from_toml {
                format!("aabridge.toml error: {err}")
            } else {
                format!("aabridge config error: {err}")
            };
            if !err.path.is_empty() {
                rendered.push_str(&format!(" for setting `{}`", err.path.join(".")));
            }
            if unique.insert(rendered.clone()) {
                unique_errors.push(rendered);
            }
        }
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        for err in unique_errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}

/// Errors raised while loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Extract(#[from] ExtractConfigError),
    #[error("no chains configured")]
    NoChains,
    #[error("default chain {0} is not in the configured chain list")]
    DefaultChainNotListed(ChainId),
    #[error("chain {0} is configured more than once")]
    DuplicateChain(ChainId),
    #[error("invalid rpc url for chain {chain}: {source}")]
    InvalidRpcUrl {
        chain: ChainId,
        #[source]
        source: url::ParseError,
    },
}
