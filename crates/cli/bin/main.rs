#[macro_use]
extern crate tracing;

use aabridge_cli::{handler, utils};
use clap::Parser;
use eyre::Result;

pub mod args;
pub mod cmd;

use args::{Aabridge, AabridgeSubcommand};

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    let args = Aabridge::parse();
    utils::tokio_runtime()?.block_on(main_args(args))
}

async fn main_args(args: Aabridge) -> Result<()> {
    match args.cmd {
        AabridgeSubcommand::Address(cmd) => cmd.run().await,
        AabridgeSubcommand::Send(cmd) => cmd.run().await,
        AabridgeSubcommand::Rpc(cmd) => cmd.run().await,
        AabridgeSubcommand::Config(cmd) => cmd.run(),
    }
}
