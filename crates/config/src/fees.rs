use serde::{Deserialize, Serialize};

/// Fixed gas and fee values attached to every user operation.
///
/// These are policy, not estimates. The defaults charge the account nothing: the owner submits
/// `handleOps` itself and pays for the outer transaction, so the entry point needs no prefund.
/// Networks where the account must pay its own way need explicit values here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub call_gas_limit: u64,
    pub verification_gas_limit: u64,
    pub pre_verification_gas: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            call_gas_limit: 500_000,
            verification_gas_limit: 500_000,
            pre_verification_gas: 100_000,
            max_fee_per_gas: 0,
            max_priority_fee_per_gas: 0,
        }
    }
}
