use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection status of the connector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    /// Reported optimistically by a fresh connector, before anything is bound.
    #[default]
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// Result of [`connect`](super::SmartWalletConnector::connect).
///
/// A failed connection yields no accounts and chain `0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectInfo {
    pub accounts: Vec<Address>,
    pub chain_id: ChainId,
}

impl ConnectInfo {
    pub fn is_connected(&self) -> bool {
        self.chain_id != 0
    }
}

/// Notifications emitted by the connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectorEvent {
    Connected(ConnectInfo),
    Disconnected,
    ChainChanged(ChainId),
}
