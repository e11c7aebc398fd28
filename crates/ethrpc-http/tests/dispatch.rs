use std::sync::Arc;

use ethrpc_core::{
    CallDescriptor, ErrorKind, JsonRpcError, RequestArguments, RpcError, SequentialIds,
    BATCH_METHOD,
};
use ethrpc_http::{HttpClientConfig, HttpProvider, ProviderOptions, ReqwestTransport};
use serde_json::{json, Value};
use wiremock::matchers::{any, body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, HttpProvider, Arc<SequentialIds>) {
    let server = MockServer::start().await;
    let ids = Arc::new(SequentialIds::new());
    let transport = ReqwestTransport::new(HttpClientConfig::default()).unwrap();
    let provider = HttpProvider::with_parts(
        server.uri(),
        &ProviderOptions::default(),
        Arc::new(transport),
        ids.clone(),
    )
    .unwrap();
    (server, provider, ids)
}

#[tokio::test]
async fn test_single_call_resolves_to_result() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": "eth_blockNumber",
            "params": []
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":"0x10"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = provider
        .request(RequestArguments::new("eth_blockNumber", None))
        .await
        .unwrap();
    assert_eq!(result, json!("0x10"));
}

#[tokio::test]
async fn test_result_is_returned_unmodified() {
    let (server, provider, _) = setup().await;
    let block = json!({"number": "0x1b4", "transactions": [], "uncles": null});

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "result": block})))
        .mount(&server)
        .await;

    let result: Value = provider
        .call("eth_getBlockByNumber", vec![json!("0x1b4"), json!(false)])
        .await
        .unwrap();
    assert_eq!(result, block);
}

#[tokio::test]
async fn test_non_200_is_transport_failure() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = provider
        .request(RequestArguments::new("eth_gasPrice", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    let message = err.to_string();
    assert!(message.contains(&server.uri()), "{message}");
    assert!(message.contains("eth_gasPrice"), "{message}");
    assert!(message.contains("429"), "{message}");
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    let server = MockServer::start().await;
    let endpoint = server.uri();
    drop(server);

    let provider = HttpProvider::with_parts(
        endpoint.clone(),
        &ProviderOptions::default(),
        Arc::new(ReqwestTransport::new(HttpClientConfig::default()).unwrap()),
        Arc::new(SequentialIds::new()),
    )
    .unwrap();

    let err = provider
        .request(RequestArguments::new("eth_chainId", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains(&endpoint));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_malformed_json_is_protocol_failure() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = provider
        .request(RequestArguments::new("eth_chainId", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolFailure);
    assert!(matches!(err, RpcError::Protocol { .. }));
}

#[tokio::test]
async fn test_error_payload_is_application_error() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"error": {"code": 123, "message": "boom"}}"#),
        )
        .mount(&server)
        .await;

    let err = provider
        .request(RequestArguments::new("eth_call", Some(json!([]))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ApplicationError);
    assert_eq!(
        err.payload(),
        Some(&JsonRpcError {
            code: 123,
            message: "boom".into(),
            data: None,
        })
    );
}

#[tokio::test]
async fn test_typed_call_mismatch_is_protocol_failure() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "result": "0x10"})))
        .mount(&server)
        .await;

    let err = provider
        .call::<u64>("eth_blockNumber", vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolFailure);
}

#[tokio::test]
async fn test_empty_batch_makes_no_http_call() {
    let (server, provider, ids) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = provider
        .request(RequestArguments::new(BATCH_METHOD, Some(json!([]))))
        .await
        .unwrap();
    assert_eq!(result, json!([]));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(ids.last(), 0);
}

#[tokio::test]
async fn test_batch_resolves_in_response_order() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .and(body_json(json!([
            {"id": 1, "jsonrpc": "2.0", "method": "eth_chainId", "params": []},
            {"id": 2, "jsonrpc": "2.0", "method": "eth_gasPrice", "params": []}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":1,"result":"0x1"},{"id":2,"result":"0x3b9aca00"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider
        .request(RequestArguments::new(
            BATCH_METHOD,
            Some(json!([{"method": "eth_chainId"}, {"method": "eth_gasPrice"}])),
        ))
        .await
        .unwrap();
    assert_eq!(result, json!(["0x1", "0x3b9aca00"]));
}

#[tokio::test]
async fn test_batch_with_failed_item_rejects_with_full_array() {
    let (server, provider, _) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "result": "0x1"},
            {"id": 2, "error": {"code": -32000, "message": "header not found"}},
            {"id": 3, "result": "0x5208"}
        ])))
        .mount(&server)
        .await;

    let err = provider
        .batch(vec![
            CallDescriptor::new("eth_chainId"),
            CallDescriptor::with_params("eth_getBlockByNumber", vec![json!("0xffffff"), json!(false)]),
            CallDescriptor::new("eth_estimateGas"),
        ])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AggregateFailure);
    let responses = err.responses().unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1].error_payload().unwrap().message, "header not found");
    assert_eq!(responses[2].result, Some(json!("0x5208")));
}

#[tokio::test]
async fn test_ids_increase_by_one_per_envelope() {
    let (server, provider, ids) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 0, "result": "0x1"})))
        .mount(&server)
        .await;

    provider.call::<String>("eth_chainId", vec![]).await.unwrap();
    // Batch responses are not arrays here, so these fail; their ids are still spent.
    let err = provider
        .batch(vec![CallDescriptor::new("a"), CallDescriptor::new("b"), CallDescriptor::new("c")])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolFailure);
    provider.call::<String>("eth_chainId", vec![]).await.unwrap();

    let sent: Vec<Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();

    let mut seen = Vec::new();
    for body in &sent {
        match body {
            Value::Array(items) => seen.extend(items.iter().map(|i| i["id"].as_u64().unwrap())),
            other => seen.push(other["id"].as_u64().unwrap()),
        }
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(ids.last(), 5);
}

#[tokio::test]
async fn test_extra_headers_are_sent() {
    let server = MockServer::start().await;
    let mut options = ProviderOptions::default();
    options
        .headers
        .insert("x-api-key".to_string(), "secret".to_string());
    let provider = HttpProvider::with_parts(
        server.uri(),
        &options,
        Arc::new(ReqwestTransport::new(HttpClientConfig::default()).unwrap()),
        Arc::new(SequentialIds::new()),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "result": "0x1"})))
        .expect(1)
        .mount(&server)
        .await;

    let chain: String = provider.call("eth_chainId", vec![]).await.unwrap();
    assert_eq!(chain, "0x1");
}
