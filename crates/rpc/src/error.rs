//! JSON-RPC error bindings
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

/// Represents a JSON-RPC error
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}: {message}", .code.message())]
pub struct RpcError {
    pub code: ErrorCode,
    /// error message
    pub message: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// New [`RpcError`] with the given [`ErrorCode`].
    pub const fn new(code: ErrorCode) -> Self {
        Self { message: Cow::Borrowed(code.message()), code, data: None }
    }

    /// New [`RpcError`] with the given [`ErrorCode`] and a custom message.
    pub fn with_message<M>(code: ErrorCode, message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code, message: message.into().into(), data: None }
    }

    /// Attaches structured data to the error.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Creates a new `InvalidParams` error.
    pub fn invalid_params<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::with_message(ErrorCode::InvalidParams, message)
    }

    /// Creates a new `InternalError` error with a message.
    pub fn internal_error_with<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::with_message(ErrorCode::InternalError, message)
    }

    /// The user rejected the request.
    pub const fn user_rejected() -> Self {
        Self::new(ErrorCode::UserRejected)
    }

    /// The user ended the session.
    pub const fn user_disconnected() -> Self {
        Self::new(ErrorCode::UserDisconnected)
    }

    /// Returns `true` for the codes a wallet or user emits on purpose, as opposed to failures.
    pub fn is_protocol_rejection(&self) -> bool {
        self.code.is_provider_code()
    }
}

/// List of JSON-RPC and provider error codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Server received Invalid JSON.
    ParseError,
    /// send invalid request object.
    InvalidRequest,
    /// method does not exist or valid
    MethodNotFound,
    /// invalid method parameter.
    InvalidParams,
    /// internal call error
    InternalError,
    /// Custom geth error code for reverted executions
    ExecutionError,
    /// EIP-1193: the user rejected the request.
    UserRejected,
    /// EIP-1193: the requested method and/or account has not been authorized.
    Unauthorized,
    /// EIP-1193: the provider does not support the requested method.
    UnsupportedMethod,
    /// EIP-1193: the provider is disconnected from all chains.
    Disconnected,
    /// EIP-3326: the chain has not been added to the wallet.
    UnrecognizedChain,
    /// Session protocol: the user ended the session.
    UserDisconnected,
    /// Used for server specific errors.
    ServerError(i64),
}

impl ErrorCode {
    /// Returns the error code as `i64`
    pub fn code(&self) -> i64 {
        match *self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ExecutionError => 3,
            Self::UserRejected => 4001,
            Self::Unauthorized => 4100,
            Self::UnsupportedMethod => 4200,
            Self::Disconnected => 4900,
            Self::UnrecognizedChain => 4902,
            Self::UserDisconnected => 6000,
            Self::ServerError(c) => c,
        }
    }

    /// Returns the message associated with the error
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ExecutionError => "Execution error",
            Self::UserRejected => "User rejected the request",
            Self::Unauthorized => "Unauthorized",
            Self::UnsupportedMethod => "Unsupported method",
            Self::Disconnected => "Disconnected",
            Self::UnrecognizedChain => "Unrecognized chain",
            Self::UserDisconnected => "User disconnected",
            Self::ServerError(_) => "Server error",
        }
    }

    /// Whether the code is one of the EIP-1193 / session protocol codes.
    pub const fn is_provider_code(&self) -> bool {
        matches!(
            self,
            Self::UserRejected
                | Self::Unauthorized
                | Self::UnsupportedMethod
                | Self::Disconnected
                | Self::UnrecognizedChain
                | Self::UserDisconnected
        )
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'a> Deserialize<'a> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        i64::deserialize(deserializer).map(Into::into)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            3 => Self::ExecutionError,
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4902 => Self::UnrecognizedChain,
            6000 => Self::UserDisconnected,
            _ => Self::ServerError(code),
        }
    }
}
