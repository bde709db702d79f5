mod address;
pub use address::AddressArgs;

mod config;
pub use config::ConfigArgs;

mod rpc;
pub use rpc::RpcArgs;

mod send;
pub use send::SendArgs;

use aabridge_cli::opts::ConfigOpts;
use aabridge_wallets::{OwnerOpts, SmartWalletConnector};
use eyre::Result;

/// Loads the config and connects the owner's smart account on the selected chain.
pub(crate) async fn connect(
    config: &ConfigOpts,
    owner: &OwnerOpts,
) -> Result<SmartWalletConnector> {
    let loaded = config.load_config()?;
    let chain_id = config.chain_id(&loaded);
    let connector = aabridge_cli::utils::connector(loaded, owner)?;
    let info = connector.connect(Some(chain_id)).await;
    if !info.is_connected() {
        eyre::bail!(
            "failed to connect the smart account on chain {chain_id}; \
             run with `RUST_LOG=connector=debug` for details"
        );
    }
    debug!(accounts = ?info.accounts, chain_id, "connected");
    Ok(connector)
}
