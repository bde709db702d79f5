use aabridge_cli::{opts::ConfigOpts, utils};
use aabridge_wallets::OwnerOpts;
use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;

/// CLI arguments for `aabridge send`.
#[derive(Clone, Debug, Parser)]
pub struct SendArgs {
    /// The destination of the call.
    pub to: Address,

    /// The value to send in wei, decimal or hex.
    #[arg(long)]
    pub value: Option<String>,

    /// Hex encoded calldata.
    #[arg(long, alias = "input")]
    pub data: Option<String>,

    #[command(flatten)]
    pub config: ConfigOpts,

    #[command(flatten)]
    pub owner: OwnerOpts,
}

impl SendArgs {
    pub async fn run(self) -> Result<()> {
        let Self { to, value, data, config, owner } = self;
        let intent = utils::transaction_intent(to, value.as_deref(), data.as_deref())?;
        let connector = super::connect(&config, &owner).await?;
        let hash = connector.send_transaction(&intent).await?;
        println!("{hash}");
        Ok(())
    }
}
