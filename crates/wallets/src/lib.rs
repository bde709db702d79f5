//! # aabridge-wallets
//!
//! Owner keys, ERC-4337 smart accounts and the connector that routes wallet requests through
//! them.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod account;
pub use account::{AccountFactory, BoundAccount, SmartAccount};

pub mod backend;
pub use backend::{BackendFactory, ChainBackend, HttpBackend, HttpBackendFactory};

pub mod connector;
pub use connector::{ConnectInfo, ConnectionStatus, ConnectorEvent, SmartWalletConnector};

pub mod error;
pub use error::{ConnectorError, ErrorKind, ErrorSummary, OwnerKeyError, PrivateKeyError};

pub mod owner;
pub use owner::{owner_from_mnemonic, owner_from_private_key};

mod raw_wallet;
pub use raw_wallet::OwnerOpts;

pub mod user_op;
pub use user_op::{InclusionReceipt, UserOperation, UserOperationBuilder};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
