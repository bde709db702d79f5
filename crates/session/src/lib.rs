//! # aabridge-session
//!
//! Exposes a smart-account wallet to dApps over a session protocol: pairing, session
//! proposals and the request/response loop, with chain switching ahead of every signing or
//! sending request.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod bridge;
pub mod error;
pub mod namespaces;
pub mod pairing;
pub mod switch;
pub mod wallet;

pub use bridge::{BridgeEvent, SessionBridge};
pub use error::{BridgeError, PairingError};
pub use namespaces::{ProposeNamespace, ProposeNamespaces, SettleNamespace, SettleNamespaces};
pub use pairing::{
    ActiveSession, Metadata, PairingClient, PairingUri, SessionProposal, SessionRequest,
};
pub use switch::{ChainSwitchIntent, chain_switch_intent, chain_switch_required, parse_caip2};
pub use wallet::SessionWallet;
