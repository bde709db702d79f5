//! Typed view over inbound wallet requests.

use crate::{error::RpcError, method::RpcMethod, typed_data::TypedDataPayload};
use alloy_primitives::{Address, Bytes, U256, hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plain transaction intent: what the dApp asked the wallet to send.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    pub to: Address,
    #[serde(default, alias = "input")]
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
}

/// A wallet request classified by method, with its parameters decoded.
#[derive(Clone, Debug)]
pub enum WalletRequest {
    SendTransaction(TransactionIntent),
    PersonalSign { message: Bytes },
    EthSign { message: Bytes },
    SignTypedData { method: RpcMethod, payload: TypedDataPayload },
    SwitchChain { chain_id: u64 },
    AddChain(Value),
    Other { method: String, params: Value },
}

impl WalletRequest {
    /// Decodes `params` according to `method`.
    ///
    /// Unknown methods never fail; their params are kept as-is.
    pub fn parse(method: &str, params: Value) -> Result<Self, RpcError> {
        let method = RpcMethod::from(method);
        let request = match method {
            RpcMethod::EthSendTransaction => Self::SendTransaction(transaction_intent(&params)?),
            RpcMethod::PersonalSign => Self::PersonalSign { message: message_param(&params, 0)? },
            RpcMethod::EthSign => Self::EthSign { message: message_param(&params, 1)? },
            RpcMethod::EthSignTypedData
            | RpcMethod::EthSignTypedDataV3
            | RpcMethod::EthSignTypedDataV4 => {
                let payload = param(&params, 1)?.clone();
                Self::SignTypedData { method, payload: TypedDataPayload::parse(payload) }
            }
            RpcMethod::WalletSwitchEthereumChain => {
                let chain_id = param(&params, 0)?
                    .get("chainId")
                    .ok_or_else(|| RpcError::invalid_params("missing chainId"))?;
                Self::SwitchChain { chain_id: parse_chain_id(chain_id)? }
            }
            RpcMethod::WalletAddEthereumChain => {
                Self::AddChain(params.get(0).cloned().unwrap_or(Value::Null))
            }
            RpcMethod::Other(method) => Self::Other { method, params },
        };
        Ok(request)
    }

    pub fn method(&self) -> RpcMethod {
        match self {
            Self::SendTransaction(_) => RpcMethod::EthSendTransaction,
            Self::PersonalSign { .. } => RpcMethod::PersonalSign,
            Self::EthSign { .. } => RpcMethod::EthSign,
            Self::SignTypedData { method, .. } => method.clone(),
            Self::SwitchChain { .. } => RpcMethod::WalletSwitchEthereumChain,
            Self::AddChain(_) => RpcMethod::WalletAddEthereumChain,
            Self::Other { method, .. } => RpcMethod::Other(method.clone()),
        }
    }
}

fn param(params: &Value, index: usize) -> Result<&Value, RpcError> {
    params
        .get(index)
        .filter(|value| !value.is_null())
        .ok_or_else(|| RpcError::invalid_params(format!("missing parameter at index {index}")))
}

fn transaction_intent(params: &Value) -> Result<TransactionIntent, RpcError> {
    serde_json::from_value(param(params, 0)?.clone())
        .map_err(|err| RpcError::invalid_params(format!("invalid transaction: {err}")))
}

/// Messages are usually hex, but some dApps send plain text.
fn message_param(params: &Value, index: usize) -> Result<Bytes, RpcError> {
    let Value::String(message) = param(params, index)? else {
        return Err(RpcError::invalid_params("message must be a string"));
    };
    if message.starts_with("0x")
        && let Ok(bytes) = hex::decode(message)
    {
        return Ok(bytes.into());
    }
    Ok(Bytes::copy_from_slice(message.as_bytes()))
}

/// Parses a chain id given either as a hex quantity or as a JSON number.
pub fn parse_chain_id(value: &Value) -> Result<u64, RpcError> {
    match value {
        Value::Number(num) => {
            num.as_u64().ok_or_else(|| RpcError::invalid_params(format!("invalid chainId {num}")))
        }
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|_| RpcError::invalid_params(format!("invalid chainId {s:?}")))
        }
        other => Err(RpcError::invalid_params(format!("invalid chainId {other}"))),
    }
}
