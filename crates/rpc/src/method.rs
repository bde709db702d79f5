//! The wallet methods the bridge understands.

use std::{convert::Infallible, fmt, str::FromStr};

/// Wallet JSON-RPC methods with dedicated handling.
///
/// Method names are case-sensitive. Anything not listed here is [`RpcMethod::Other`] and is
/// forwarded untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    EthSendTransaction,
    PersonalSign,
    EthSign,
    EthSignTypedData,
    EthSignTypedDataV3,
    EthSignTypedDataV4,
    WalletSwitchEthereumChain,
    WalletAddEthereumChain,
    Other(String),
}

impl RpcMethod {
    /// Every method with dedicated handling, in the order advertised to dApps.
    pub const SUPPORTED: [Self; 8] = [
        Self::EthSendTransaction,
        Self::PersonalSign,
        Self::EthSign,
        Self::EthSignTypedData,
        Self::EthSignTypedDataV3,
        Self::EthSignTypedDataV4,
        Self::WalletSwitchEthereumChain,
        Self::WalletAddEthereumChain,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::EthSendTransaction => "eth_sendTransaction",
            Self::PersonalSign => "personal_sign",
            Self::EthSign => "eth_sign",
            Self::EthSignTypedData => "eth_signTypedData",
            Self::EthSignTypedDataV3 => "eth_signTypedData_v3",
            Self::EthSignTypedDataV4 => "eth_signTypedData_v4",
            Self::WalletSwitchEthereumChain => "wallet_switchEthereumChain",
            Self::WalletAddEthereumChain => "wallet_addEthereumChain",
            Self::Other(method) => method,
        }
    }

    /// Methods that sign or send on behalf of the account, and therefore must run on the chain
    /// the request was issued for.
    pub fn requires_active_chain(&self) -> bool {
        matches!(
            self,
            Self::EthSendTransaction
                | Self::PersonalSign
                | Self::EthSign
                | Self::EthSignTypedData
                | Self::EthSignTypedDataV3
                | Self::EthSignTypedDataV4
        )
    }
}

impl From<&str> for RpcMethod {
    fn from(method: &str) -> Self {
        match method {
            "eth_sendTransaction" => Self::EthSendTransaction,
            "personal_sign" => Self::PersonalSign,
            "eth_sign" => Self::EthSign,
            "eth_signTypedData" => Self::EthSignTypedData,
            "eth_signTypedData_v3" => Self::EthSignTypedDataV3,
            "eth_signTypedData_v4" => Self::EthSignTypedDataV4,
            "wallet_switchEthereumChain" => Self::WalletSwitchEthereumChain,
            "wallet_addEthereumChain" => Self::WalletAddEthereumChain,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for RpcMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
