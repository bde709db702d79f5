//! Deciding whether a request has to move the wallet to another chain first.

use crate::{namespaces::EIP155, pairing::SessionRequest};
use aabridge_rpc::RpcMethod;
use alloy_primitives::ChainId;

/// A chain the wallet must be on before a request may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainSwitchIntent {
    pub target_chain_id: ChainId,
    pub required: bool,
}

/// Parses a CAIP-2 `eip155:<id>` chain reference.
pub fn parse_caip2(chain: &str) -> Option<ChainId> {
    let (namespace, reference) = chain.split_once(':')?;
    if namespace != EIP155 {
        return None;
    }
    reference.parse().ok()
}

/// Computes the switch `request` needs while the wallet is on `active`.
///
/// Returns `None` when the declared chain cannot be parsed. Only signing and sending methods
/// require a switch; chain switches and additions carry their own target.
pub fn chain_switch_intent(
    request: &SessionRequest,
    active: Option<ChainId>,
) -> Option<ChainSwitchIntent> {
    let target_chain_id = parse_caip2(&request.chain_id)?;
    let required = Some(target_chain_id) != active
        && RpcMethod::from(request.method.as_str()).requires_active_chain();
    Some(ChainSwitchIntent { target_chain_id, required })
}

/// Whether `request` must switch the wallet off `active` before it runs.
pub fn chain_switch_required(request: &SessionRequest, active: Option<ChainId>) -> bool {
    chain_switch_intent(request, active).is_some_and(|intent| intent.required)
}
