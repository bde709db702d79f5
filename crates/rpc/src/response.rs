//! JSON-RPC 2.0 response envelopes.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The JSON-RPC protocol version marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    #[default]
    #[serde(rename = "2.0")]
    V2,
}

/// A request identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    String(String),
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => num.fmt(f),
            Self::String(s) => s.fmt(f),
        }
    }
}

/// Either the successful `result` or the `error` of a call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseResult {
    #[serde(rename = "result")]
    Success(Value),
    #[serde(rename = "error")]
    Error(RpcError),
}

impl ResponseResult {
    pub fn success<S: Serialize>(content: S) -> Self {
        serde_json::to_value(&content)
            .map(Self::Success)
            .unwrap_or_else(|err| Self::Error(RpcError::internal_error_with(err.to_string())))
    }

    pub fn error(error: RpcError) -> Self {
        Self::Error(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn as_error(&self) -> Option<&RpcError> {
        match self {
            Self::Error(err) => Some(err),
            Self::Success(_) => None,
        }
    }
}

impl From<RpcError> for ResponseResult {
    fn from(err: RpcError) -> Self {
        Self::Error(err)
    }
}

/// A complete response envelope: `{ id, jsonrpc: "2.0", result | error }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    jsonrpc: Version,
    pub id: Id,
    #[serde(flatten)]
    pub result: ResponseResult,
}

impl RpcResponse {
    pub fn new(id: impl Into<Id>, result: impl Into<ResponseResult>) -> Self {
        Self { jsonrpc: Version::V2, id: id.into(), result: result.into() }
    }

    pub fn success(id: impl Into<Id>, content: impl Serialize) -> Self {
        Self::new(id, ResponseResult::success(content))
    }

    pub fn rejected(id: impl Into<Id>) -> Self {
        Self::new(id, RpcError::user_rejected())
    }
}
