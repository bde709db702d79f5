use aabridge_cli::opts::ConfigOpts;
use aabridge_wallets::OwnerOpts;
use clap::Parser;
use eyre::Result;

/// CLI arguments for `aabridge address`.
#[derive(Clone, Debug, Parser)]
pub struct AddressArgs {
    /// Print the account as JSON, including its owner and chain.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pub config: ConfigOpts,

    #[command(flatten)]
    pub owner: OwnerOpts,
}

impl AddressArgs {
    pub async fn run(self) -> Result<()> {
        let connector = super::connect(&self.config, &self.owner).await?;
        let account =
            connector.account().ok_or_else(|| eyre::eyre!("no account is bound after connecting"))?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&account)?);
        } else {
            println!("{}", account.address);
        }
        Ok(())
    }
}
