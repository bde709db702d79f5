use aabridge_rpc::{ErrorCode, RpcError};
use alloy_primitives::{
    Bytes, ChainId, TxHash,
    hex::{self, FromHexError},
};
use alloy_signer::k256::ecdsa;
use alloy_signer_local::LocalSignerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{error::Error, fmt, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum PrivateKeyError {
    #[error("Failed to create owner from private key. Private key is invalid hex: {0}")]
    InvalidHex(#[from] FromHexError),
    #[error(
        "Failed to create owner from private key. Invalid private key. But env var {0} exists. Is the `$` anchor missing?"
    )]
    ExistsAsEnvVar(String),
}

/// Errors raised while deriving the owner key.
#[derive(Debug, thiserror::Error)]
pub enum OwnerKeyError {
    #[error(transparent)]
    PrivateKey(#[from] PrivateKeyError),
    #[error("invalid private key: {0}")]
    Ecdsa(#[from] ecdsa::Error),
    #[error(transparent)]
    Local(#[from] LocalSignerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no owner key: pass a private key or a mnemonic")]
    Missing,
}

/// Errors surfaced by the smart-account connector.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// No chain is bound, or the connection was torn down mid-flight.
    #[error("wallet is not connected")]
    NotConnected,
    /// The chain is not in the configured allow-list.
    #[error("chain {0} is not configured")]
    ChainNotConfigured(ChainId),
    #[error("failed to sign: {0}")]
    Signature(#[from] alloy_signer::Error),
    /// The entry point or the account reverted.
    #[error("{}", revert_message(reason.as_deref(), data.as_ref()))]
    ExecutionReverted { reason: Option<String>, data: Option<Bytes> },
    #[error("transaction {hash} was not included within {timeout:?}")]
    InclusionTimeout { hash: TxHash, timeout: Duration },
    /// An error response returned by the node or the owner wallet.
    #[error("{0}")]
    Rpc(RpcError),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectorError {
    pub fn reverted(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::ExecutionReverted { reason: crate::user_op::decode_revert(&data), data: Some(data) }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::ChainNotConfigured(_) => ErrorKind::ChainNotConfigured,
            Self::Signature(_) => ErrorKind::SignatureError,
            Self::ExecutionReverted { .. } => ErrorKind::ExecutionReverted,
            Self::InclusionTimeout { .. } => ErrorKind::InclusionTimeout,
            Self::Rpc(err) => ErrorKind::from_code(err.code),
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// The shortest message that still says what went wrong.
    pub fn short_message(&self) -> String {
        match self {
            Self::ExecutionReverted { reason: Some(reason), .. } => reason.clone(),
            Self::Rpc(err) => err
                .data
                .as_ref()
                .and_then(data_message)
                .unwrap_or_else(|| err.message.to_string()),
            _ => self.to_string(),
        }
    }

    pub fn summary(&self) -> ErrorSummary {
        let code = match self {
            Self::Rpc(err) => Some(err.code),
            _ => None,
        };
        ErrorSummary { kind: self.kind(), message: self.short_message(), code }
    }
}

impl From<RpcError> for ConnectorError {
    fn from(err: RpcError) -> Self {
        match err.code {
            ErrorCode::InvalidParams => Self::InvalidParams(err.message.into_owned()),
            _ => Self::Rpc(err),
        }
    }
}

fn revert_message(reason: Option<&str>, data: Option<&Bytes>) -> String {
    match (reason, data) {
        (Some(reason), _) => format!("execution reverted: {reason}"),
        (None, Some(data)) if !data.is_empty() => {
            format!("execution reverted with data {}", hex::encode_prefixed(data))
        }
        _ => "execution reverted".to_string(),
    }
}

/// A normalized error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotConnected,
    ChainNotConfigured,
    SignatureError,
    ExecutionReverted,
    InclusionTimeout,
    /// A deliberate rejection carrying an EIP-1193 or session code.
    ProtocolRejection,
    MalformedPayload,
    InvalidParams,
    /// A node error response without a more specific category.
    Rpc,
    Transport,
    Other,
}

impl ErrorKind {
    fn from_code(code: ErrorCode) -> Self {
        match code {
            code if code.is_provider_code() => Self::ProtocolRejection,
            ErrorCode::ExecutionError => Self::ExecutionReverted,
            ErrorCode::InvalidParams => Self::InvalidParams,
            _ => Self::Rpc,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotConnected => "not connected",
            Self::ChainNotConfigured => "chain not configured",
            Self::SignatureError => "signature error",
            Self::ExecutionReverted => "execution reverted",
            Self::InclusionTimeout => "inclusion timeout",
            Self::ProtocolRejection => "protocol rejection",
            Self::MalformedPayload => "malformed payload",
            Self::InvalidParams => "invalid params",
            Self::Rpc => "rpc error",
            Self::Transport => "transport error",
            Self::Other => "error",
        };
        f.write_str(s)
    }
}

/// A normalized error: the category plus one human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub message: String,
    /// The wire code, when the error came with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ErrorSummary {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), code: None }
    }

    /// Summarizes an error, walking its causes for the most specific one.
    ///
    /// The innermost [`ConnectorError`] or [`RpcError`] wins. Errors with neither in their chain
    /// are reported as [`ErrorKind::Other`] with the outermost message.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut best = None;
        let mut cause = Some(err);
        while let Some(err) = cause {
            if let Some(err) = err.downcast_ref::<ConnectorError>() {
                best = Some(err.summary());
            } else if let Some(err) = err.downcast_ref::<RpcError>() {
                best = Some(ConnectorError::Rpc(err.clone()).summary());
            }
            cause = err.source();
        }
        best.unwrap_or_else(|| Self::new(ErrorKind::Other, err.to_string()))
    }

    /// The JSON-RPC error reported to the session peer.
    pub fn to_rpc_error(&self) -> RpcError {
        let code = match self.kind {
            ErrorKind::NotConnected => ErrorCode::Disconnected,
            ErrorKind::ChainNotConfigured => ErrorCode::UnrecognizedChain,
            ErrorKind::ExecutionReverted => ErrorCode::ExecutionError,
            ErrorKind::MalformedPayload | ErrorKind::InvalidParams => ErrorCode::InvalidParams,
            ErrorKind::ProtocolRejection | ErrorKind::Rpc => {
                self.code.unwrap_or(ErrorCode::InternalError)
            }
            ErrorKind::SignatureError
            | ErrorKind::InclusionTimeout
            | ErrorKind::Transport
            | ErrorKind::Other => ErrorCode::InternalError,
        };
        RpcError::with_message(code, self.message.clone())
    }
}

impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn data_message(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.starts_with("0x") => Some(s.clone()),
        Value::Object(_) => ["message", "name"]
            .iter()
            .find_map(|key| data.get(key).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    }
}
