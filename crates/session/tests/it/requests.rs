use crate::utils::{Harness, request};
use aabridge_config::Config;
use aabridge_rpc::{ErrorCode, ResponseResult};
use aabridge_session::BridgeEvent;
use aabridge_wallets::{
    ConnectionStatus, ConnectorEvent, account::SignatureWrapper, user_op::IEntryPoint,
};
use alloy_primitives::{Address, Bytes, Signature, U256, address, eip191_hash_message};
use alloy_sol_types::{SolError, SolValue};
use serde_json::{Value, json};
use similar_asserts::assert_eq;

const RECIPIENT: Address = address!("0x000000000000000000000000000000000000dEaD");

fn result(response: &aabridge_rpc::RpcResponse) -> &Value {
    match &response.result {
        ResponseResult::Success(value) => value,
        ResponseResult::Error(err) => panic!("unexpected error response: {err}"),
    }
}

fn error_code(response: &aabridge_rpc::RpcResponse) -> ErrorCode {
    response.result.as_error().expect("error response").code
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_transaction_on_base() {
    let harness = Harness::connected(8453).await;
    let owner = harness.connector.owner_address();
    let account = harness.connector.account().unwrap();

    let req = request(
        1,
        "eip155:8453",
        "eth_sendTransaction",
        json!([{ "to": RECIPIENT, "value": "0x2a", "data": "0x1234" }]),
    );
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    let backend = harness.backend(8453);
    let hash = backend.last_tx_hash().unwrap();
    assert_eq!(result(&response), &json!(hash.to_string()));

    let submitted = backend.submitted();
    assert_eq!(submitted.len(), 1);
    let (entry_point, ops, beneficiary) = &submitted[0];
    assert_eq!(*entry_point, Config::ENTRY_POINT_V06);
    assert_eq!(*beneficiary, owner);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].sender, account.address);
    let call = ops[0].decode_call().unwrap();
    assert_eq!(call.target, RECIPIENT);
    assert_eq!(call.value, U256::from(42));
    assert_eq!(call.data, Bytes::from_static(&[0x12, 0x34]));

    assert_eq!(harness.pairing.responses(), vec![response]);
    assert_eq!(harness.pairing.responses.lock()[0].0, "topic-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_request_has_no_effect() {
    let harness = Harness::connected(8453).await;
    let req = request(
        2,
        "eip155:8453",
        "eth_sendTransaction",
        json!([{ "to": RECIPIENT, "value": "0x1" }]),
    );
    let response = harness.bridge.handle_request(&req, false).await.unwrap();

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": { "code": 4001, "message": "User rejected the request" }
        })
    );
    assert!(harness.backend(8453).submitted().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn switches_chain_before_signing() {
    let harness = Harness::connected(8453).await;
    let mut connector_events = harness.connector.subscribe();
    let message = "hello from mainnet";

    let req = request(
        3,
        "eip155:1",
        "personal_sign",
        json!([message, harness.connector.owner_address()]),
    );
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(harness.connector.get_chain_id().unwrap(), 1);
    assert!(matches!(connector_events.try_recv(), Ok(ConnectorEvent::ChainChanged(1))));

    let signature: Bytes = serde_json::from_value(result(&response).clone()).unwrap();
    let signature = Signature::try_from(signature.as_ref()).unwrap();
    assert_eq!(
        signature.recover_address_from_msg(message).unwrap(),
        harness.connector.owner_address()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_switch_fails_request() {
    let harness = Harness::connected(8453).await;
    let req = request(
        4,
        "eip155:137",
        "eth_sendTransaction",
        json!([{ "to": RECIPIENT }]),
    );
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(error_code(&response), ErrorCode::UnrecognizedChain);
    assert_eq!(harness.connector.get_chain_id().unwrap(), 8453);
    assert!(harness.backend(8453).submitted().is_empty());
    assert_eq!(harness.pairing.responses().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn disconnected_wallet_does_not_execute() {
    let harness = Harness::connected(8453).await;
    harness.connector.disconnect();

    for (id, method, params) in [
        (20, "eth_sendTransaction", json!([{ "to": RECIPIENT, "value": "0x1" }])),
        (21, "personal_sign", json!(["0x68656c6c6f", Address::ZERO])),
        (22, "eth_signTypedData_v4", json!([Address::ZERO, "raw text"])),
    ] {
        let req = request(id, "eip155:8453", method, params);
        let response = harness.bridge.handle_request(&req, true).await.unwrap();
        let err = response.result.as_error().expect("error response");
        assert_eq!(err.code, ErrorCode::Disconnected, "{method}");
        assert_eq!(err.code.code(), 4900);
    }

    assert!(harness.backend(8453).submitted().is_empty());
    assert_eq!(harness.connector.status(), ConnectionStatus::Disconnected);
    assert!(harness.connector.get_chain_id().is_err());
    assert_eq!(harness.pairing.responses().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn switch_request_after_disconnect_fails() {
    let harness = Harness::connected(8453).await;
    harness.connector.disconnect();

    let req =
        request(23, "eip155:8453", "wallet_switchEthereumChain", json!([{ "chainId": "0x1" }]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(error_code(&response), ErrorCode::Disconnected);
    assert!(harness.connector.account().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_declared_chain_fails_request() {
    let harness = Harness::connected(8453).await;
    let req = request(5, "eip155:base", "personal_sign", json!(["0x68656c6c6f", Address::ZERO]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();
    assert_eq!(error_code(&response), ErrorCode::UnrecognizedChain);
}

#[tokio::test(flavor = "multi_thread")]
async fn switch_ethereum_chain_to_base() {
    let harness = Harness::connected(1).await;
    let mut connector_events = harness.connector.subscribe();

    let req =
        request(6, "eip155:1", "wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(result(&response), &Value::Null);
    assert_eq!(harness.connector.get_chain_id().unwrap(), 8453);
    let mut changes = vec![];
    while let Ok(event) = connector_events.try_recv() {
        if let ConnectorEvent::ChainChanged(id) = event {
            changes.push(id);
        }
    }
    assert_eq!(changes, vec![8453]);
}

#[tokio::test(flavor = "multi_thread")]
async fn switch_to_current_chain_is_a_no_op() {
    let harness = Harness::connected(8453).await;
    let mut connector_events = harness.connector.subscribe();

    let req =
        request(7, "eip155:8453", "wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(result(&response), &Value::Null);
    assert!(connector_events.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn switch_to_unlisted_chain() {
    let harness = Harness::connected(8453).await;
    let req =
        request(8, "eip155:8453", "wallet_switchEthereumChain", json!([{ "chainId": "0x89" }]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    let err = response.result.as_error().unwrap();
    assert_eq!(err.code, ErrorCode::UnrecognizedChain);
    assert_eq!(err.code.code(), 4902);
    assert_eq!(harness.connector.get_chain_id().unwrap(), 8453);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_chain_is_acknowledged_only() {
    let mut harness = Harness::connected(8453).await;
    let connects = harness.backends.connects();
    harness.drain_events();

    let params = json!({
        "chainId": "0x89",
        "chainName": "Polygon",
        "rpcUrls": ["https://polygon-rpc.com"]
    });
    let req = request(9, "eip155:8453", "wallet_addEthereumChain", json!([params.clone()]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(result(&response), &Value::Null);
    assert_eq!(harness.connector.get_chain_id().unwrap(), 8453);
    assert_eq!(harness.backends.connects(), connects);
    assert_eq!(harness.drain_events(), vec![BridgeEvent::ChainAddRequested(params)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn signs_unparseable_typed_data_as_text() {
    let harness = Harness::connected(8453).await;
    let account = harness.connector.account().unwrap();
    let text = "{ this is not typed data";

    let req = request(
        10,
        "eip155:8453",
        "eth_signTypedData_v4",
        json!([account.address, text]),
    );
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    let signature: Bytes = serde_json::from_value(result(&response).clone()).unwrap();
    let wrapper = <SignatureWrapper as SolValue>::abi_decode(&signature).unwrap();
    assert_eq!(wrapper.ownerIndex, U256::ZERO);
    let inner = Signature::try_from(wrapper.signatureData.as_ref()).unwrap();
    let hash = account.replay_safe_hash(eip191_hash_message(text));
    assert_eq!(
        inner.recover_address_from_prehash(&hash).unwrap(),
        harness.connector.owner_address()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn every_typed_data_variant_is_signed_by_the_account() {
    let harness = Harness::connected(8453).await;
    for (id, method) in [(11, "eth_signTypedData"), (12, "eth_signTypedData_v3")] {
        let req = request(id, "eip155:8453", method, json!([Address::ZERO, "raw text"]));
        let response = harness.bridge.handle_request(&req, true).await.unwrap();
        let signature: Bytes = serde_json::from_value(result(&response).clone()).unwrap();
        assert!(<SignatureWrapper as SolValue>::abi_decode(&signature).is_ok(), "{method}");
    }
    assert!(harness.backend(8453).raw_requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reverted_operation_is_reported() {
    let harness = Harness::connected(8453).await;
    let backend = harness.backend(8453);
    let failed =
        IEntryPoint::FailedOp { opIndex: U256::ZERO, reason: "AA21 didn't pay prefund".into() };
    backend.revert_with(SolError::abi_encode(&failed));

    let req = request(13, "eip155:8453", "eth_sendTransaction", json!([{ "to": RECIPIENT }]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    let err = response.result.as_error().unwrap();
    assert_eq!(err.code, ErrorCode::ExecutionError);
    assert_eq!(err.message, "AA21 didn't pay prefund (op 0)");
    assert_eq!(backend.submitted().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_params_are_reported() {
    let harness = Harness::connected(8453).await;
    let req = request(14, "eip155:8453", "eth_sendTransaction", json!([]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();
    assert_eq!(error_code(&response), ErrorCode::InvalidParams);
}

#[tokio::test(flavor = "multi_thread")]
async fn unrecognized_method_gets_placeholder() {
    let harness = Harness::connected(8453).await;
    let req = request(15, "eip155:1", "eth_blockNumber", json!([]));
    let response = harness.bridge.handle_request(&req, true).await.unwrap();

    assert_eq!(result(&response), &json!("0x"));
    assert_eq!(harness.connector.get_chain_id().unwrap(), 8453);
    assert!(harness.backend(8453).raw_requests().is_empty());
}
