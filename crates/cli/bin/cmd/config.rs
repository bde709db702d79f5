use aabridge_cli::{opts::ConfigOpts, utils};
use clap::Parser;
use eyre::Result;

/// CLI arguments for `aabridge config`.
#[derive(Clone, Debug, Parser)]
pub struct ConfigArgs {
    /// Print the config as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pub config: ConfigOpts,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load_config()?;
        print!("{}", utils::render_config(&config, self.json)?);
        Ok(())
    }
}
