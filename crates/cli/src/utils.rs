use aabridge_config::Config;
use aabridge_rpc::TransactionIntent;
use aabridge_wallets::{HttpBackendFactory, OwnerOpts, SmartWalletConnector};
use alloy_primitives::{Address, Bytes, U256, hex};
use eyre::{Result, WrapErr};
use serde_json::Value;
use std::sync::Arc;

/// Initializes a tracing Subscriber for logging.
///
/// Logs go to stderr so command output stays parseable.
pub fn subscriber() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Creates the multi-threaded runtime commands run on.
pub fn tokio_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread().enable_all().build()?)
}

/// Renders `config` the way it would be written to `aabridge.toml`, or as JSON.
pub fn render_config(config: &Config, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(config)?);
    }
    // Fee fields are u128, which TOML cannot represent directly.
    let value = serde_json::to_value(config)?;
    Ok(toml::to_string_pretty(&value)?)
}

/// Builds a connector for the owner selected by `opts`, talking to the configured nodes.
pub fn connector(config: Config, opts: &OwnerOpts) -> Result<SmartWalletConnector> {
    let owner = opts.owner()?;
    let backends = HttpBackendFactory::new().with_poll_interval(config.poll_interval());
    Ok(SmartWalletConnector::new(Arc::new(config), owner, Arc::new(backends))
        .with_owner_index(opts.owner_index)
        .with_account_address(opts.account))
}

/// Parses a value given in wei, either decimal or `0x`-prefixed hex.
pub fn parse_value(value: &str) -> Result<U256> {
    value.parse::<U256>().wrap_err_with(|| format!("invalid value `{value}`"))
}

/// Builds the transaction intent for `aabridge send`.
pub fn transaction_intent(
    to: Address,
    value: Option<&str>,
    data: Option<&str>,
) -> Result<TransactionIntent> {
    let value = value.map(parse_value).transpose()?.unwrap_or_default();
    let data = match data {
        Some(data) => Bytes::from(hex::decode(data).wrap_err("invalid calldata")?),
        None => Bytes::new(),
    };
    Ok(TransactionIntent { to, data, value, gas: None })
}

/// Interprets a command line argument as JSON, falling back to a plain string.
pub fn value_or_string(value: String) -> Value {
    serde_json::from_str(&value).unwrap_or(Value::String(value))
}
