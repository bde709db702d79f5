use aabridge_config::Config;
use alloy_primitives::ChainId;
use clap::Parser;
use eyre::Result;
use std::path::PathBuf;

/// Options shared by every command.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Config options", about = None, long_about = None)]
pub struct ConfigOpts {
    /// The directory to look up `aabridge.toml` in.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "PATH", env = "AABRIDGE_ROOT")]
    pub root: Option<PathBuf>,

    /// The chain to operate on instead of the configured default.
    #[arg(long, short, value_name = "CHAIN_ID")]
    pub chain: Option<ChainId>,
}

impl ConfigOpts {
    /// Loads and validates the config.
    pub fn load_config(&self) -> Result<Config> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let config = Config::load_with_root(&root)?;
        if let Some(chain) = self.chain
            && !config.is_allowed(chain)
        {
            eyre::bail!(
                "chain {chain} is not configured; configured chains: {:?}",
                config.chain_ids().collect::<Vec<_>>()
            );
        }
        Ok(config)
    }

    /// The chain selected on the command line, or the configured default.
    pub fn chain_id(&self, config: &Config) -> ChainId {
        self.chain.unwrap_or(config.default_chain)
    }
}
