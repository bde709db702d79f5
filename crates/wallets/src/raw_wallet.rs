use crate::{
    error::OwnerKeyError,
    owner::{owner_from_mnemonic, owner_from_private_key},
};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;

/// The options selecting the owner key and the smart account it controls.
///
/// The owner key is either:
/// 1. Private Key (cleartext in CLI or `AABRIDGE_PRIVATE_KEY`)
/// 2. Mnemonic (phrase or file path)
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Owner options", about = None, long_about = None)]
pub struct OwnerOpts {
    /// Use the provided private key.
    #[arg(long, value_name = "RAW_PRIVATE_KEY", env = "AABRIDGE_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// Use the mnemonic phrase of mnemonic file at the specified path.
    #[arg(long, alias = "mnemonic-path", conflicts_with = "private_key")]
    pub mnemonic: Option<String>,

    /// Use a BIP39 passphrase for the mnemonic.
    #[arg(long, value_name = "PASSPHRASE", requires = "mnemonic")]
    pub mnemonic_passphrase: Option<String>,

    /// Use the private key from the given mnemonic index.
    #[arg(long, default_value_t = 0, value_name = "INDEX")]
    pub mnemonic_index: u32,

    /// The owner's slot in the account's owner list.
    #[arg(long, default_value_t = 0, value_name = "INDEX")]
    pub owner_index: u32,

    /// Use this smart account address instead of deriving it.
    #[arg(long, value_name = "ADDRESS")]
    pub account: Option<Address>,
}

impl OwnerOpts {
    /// Derives the owner key from whichever secret was given.
    pub fn owner(&self) -> Result<PrivateKeySigner, OwnerKeyError> {
        if let Some(private_key) = &self.private_key {
            return owner_from_private_key(private_key);
        }
        if let Some(mnemonic) = &self.mnemonic {
            return owner_from_mnemonic(
                mnemonic,
                self.mnemonic_passphrase.as_deref(),
                self.mnemonic_index,
            );
        }
        Err(OwnerKeyError::Missing)
    }
}
