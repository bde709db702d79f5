use alloy_dyn_abi::TypedData;
use serde_json::Value;

/// An [EIP-712] payload as received over the wire.
///
/// dApps send the payload either as a JSON object or as its textual encoding. Parsing is
/// tolerant: text that does not decode into [`TypedData`] is kept verbatim and signed as-is.
///
/// [EIP-712]: https://eips.ethereum.org/EIPS/eip-712
#[derive(Clone, Debug)]
pub enum TypedDataPayload {
    Structured(Box<TypedData>),
    Raw(String),
}

impl TypedDataPayload {
    pub fn parse(value: Value) -> Self {
        match value {
            Value::String(text) => match serde_json::from_str::<TypedData>(&text) {
                Ok(typed) => Self::Structured(Box::new(typed)),
                Err(_) => Self::Raw(text),
            },
            other => match serde_json::from_value::<TypedData>(other.clone()) {
                Ok(typed) => Self::Structured(Box::new(typed)),
                Err(_) => Self::Raw(other.to_string()),
            },
        }
    }

    pub fn as_structured(&self) -> Option<&TypedData> {
        match self {
            Self::Structured(typed) => Some(typed),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

impl From<TypedData> for TypedDataPayload {
    fn from(typed: TypedData) -> Self {
        Self::Structured(Box::new(typed))
    }
}
