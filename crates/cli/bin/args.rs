use crate::cmd::{AddressArgs, ConfigArgs, RpcArgs, SendArgs};
use clap::{Parser, Subcommand};

/// Drive an ERC-4337 smart account from the command line.
#[derive(Debug, Parser)]
#[command(name = "aabridge", version, next_display_order = None)]
pub struct Aabridge {
    #[command(subcommand)]
    pub cmd: AabridgeSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AabridgeSubcommand {
    /// Print the smart account controlled by the owner key.
    #[command(visible_alias = "a")]
    Address(AddressArgs),

    /// Send a transaction from the smart account as a user operation.
    #[command(visible_alias = "s")]
    Send(SendArgs),

    /// Perform a raw wallet request through the smart-account connector.
    Rpc(RpcArgs),

    /// Print the resolved configuration.
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Aabridge::command().debug_assert();
    }

    #[test]
    fn parses_send() {
        let args = Aabridge::parse_from([
            "aabridge",
            "send",
            "0x000000000000000000000000000000000000dEaD",
            "--value",
            "0x2a",
            "--chain",
            "84532",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ]);
        let AabridgeSubcommand::Send(send) = args.cmd else { panic!("expected send") };
        assert_eq!(send.value.as_deref(), Some("0x2a"));
        assert_eq!(send.config.chain, Some(84532));
        assert!(send.owner.private_key.is_some());
    }
}
