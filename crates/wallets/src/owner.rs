//! Owner key derivation.

use crate::error::{OwnerKeyError, PrivateKeyError};
use alloy_primitives::{B256, hex::FromHex};
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use std::{fs, path::Path};

/// The BIP-44 prefix for Ethereum accounts; the derivation index is appended.
pub const DEFAULT_DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

fn ensure_pk_not_env(pk: &str) -> Result<(), PrivateKeyError> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        return Err(PrivateKeyError::ExistsAsEnvVar(pk.to_string()));
    }
    Ok(())
}

/// Creates the owner key from a `0x`-prefixed or bare 32-byte hex private key.
pub fn owner_from_private_key(private_key: &str) -> Result<PrivateKeySigner, OwnerKeyError> {
    let private_key = private_key.trim();
    let bytes = match B256::from_hex(private_key) {
        Ok(bytes) => bytes,
        Err(err) => {
            ensure_pk_not_env(private_key)?;
            return Err(PrivateKeyError::InvalidHex(err).into());
        }
    };
    match PrivateKeySigner::from_bytes(&bytes) {
        Ok(signer) => Ok(signer),
        Err(err) => {
            ensure_pk_not_env(private_key)?;
            Err(err.into())
        }
    }
}

/// Creates the owner key from a mnemonic.
///
/// `mnemonic` is either a phrase or the path of a file holding one.
pub fn owner_from_mnemonic(
    mnemonic: &str,
    passphrase: Option<&str>,
    index: u32,
) -> Result<PrivateKeySigner, OwnerKeyError> {
    let mnemonic = if Path::new(mnemonic).is_file() {
        fs::read_to_string(mnemonic)?
    } else {
        mnemonic.to_owned()
    };
    let mnemonic = mnemonic.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut builder = MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .derivation_path(format!("{DEFAULT_DERIVATION_PATH_PREFIX}{index}"))?;
    if let Some(passphrase) = passphrase {
        builder = builder.password(passphrase);
    }
    let signer = builder.build()?;
    trace!(target: "owner", address = %signer.address(), index, "derived owner from mnemonic");
    Ok(signer)
}
