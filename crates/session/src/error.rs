use aabridge_wallets::{ConnectorError, ErrorKind, ErrorSummary};

/// Errors raised by the pairing layer.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("invalid pairing uri: {0}")]
    InvalidUri(String),
    #[error("unknown session topic {0}")]
    UnknownTopic(String),
    #[error("unknown proposal {0}")]
    UnknownProposal(u64),
    #[error("pairing transport error: {0}")]
    Transport(String),
}

/// Errors raised by the session bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Pairing(#[from] PairingError),
    #[error(transparent)]
    Wallet(#[from] ConnectorError),
    #[error("no pending proposal with id {0}")]
    UnknownProposal(u64),
    /// The proposal requires a namespace other than `eip155`.
    #[error("unsupported namespace {0}")]
    UnsupportedNamespace(String),
    /// The proposal requires a chain outside the allow-list.
    #[error("unsupported chain {0}")]
    UnsupportedChain(String),
    #[error("the wallet has no account to expose")]
    NoAccount,
    #[error("another request is already in progress")]
    RequestInProgress,
    #[error("no request in progress")]
    NoCurrentRequest,
}

impl BridgeError {
    /// Classifies the error for the session peer.
    pub fn summary(&self) -> ErrorSummary {
        match self {
            Self::Wallet(err) => err.summary(),
            Self::UnsupportedChain(_) => {
                ErrorSummary::new(ErrorKind::ChainNotConfigured, self.to_string())
            }
            Self::Pairing(_) => ErrorSummary::new(ErrorKind::Transport, self.to_string()),
            _ => ErrorSummary::from_error(self),
        }
    }
}
