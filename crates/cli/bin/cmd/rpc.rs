use aabridge_cli::{opts::ConfigOpts, utils};
use aabridge_wallets::OwnerOpts;
use clap::Parser;
use eyre::Result;
use serde_json::Value;

/// CLI arguments for `aabridge rpc`.
#[derive(Clone, Debug, Parser)]
pub struct RpcArgs {
    /// RPC method name
    method: String,

    /// RPC parameters
    ///
    /// Interpreted as JSON:
    ///
    /// aabridge rpc personal_sign 0x68656c6c6f 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
    /// => {"method": "personal_sign", "params": ["0x68656c6c6f", "0xf39F..."] ... }
    params: Vec<String>,

    /// Send raw JSON parameters
    ///
    /// The first param will be interpreted as a raw JSON array of params.
    ///
    /// aabridge rpc eth_signTypedData_v4 '["0x...", {"types": ...}]' --raw
    #[arg(long, short = 'w')]
    raw: bool,

    #[command(flatten)]
    pub config: ConfigOpts,

    #[command(flatten)]
    pub owner: OwnerOpts,
}

impl RpcArgs {
    pub async fn run(self) -> Result<()> {
        let Self { method, params, raw, config, owner } = self;
        let params = if raw {
            let raw = params.join(" ");
            if raw.is_empty() {
                eyre::bail!("Empty JSON parameters");
            }
            serde_json::from_str(&raw)?
        } else {
            Value::Array(params.into_iter().map(utils::value_or_string).collect())
        };

        let connector = super::connect(&config, &owner).await?;
        let response = connector.request(&method, params).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
