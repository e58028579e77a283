use std::sync::Arc;
use std::time::Duration;

use fallback_rpc::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Network ids here are arbitrary; nothing is looked up by id.
const TEST_NETWORK_ID: u64 = 424242;

fn build_mock_jsonrpc_response(id: u64, result: serde_json::Value) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn normalize(url: &str) -> &str { url.trim_end_matches('/') }

/// Answers the block number probe, optionally after a delay.
async fn mount_probe(server: &MockServer, delay_ms: u64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(build_mock_jsonrpc_response(1, json!("0x1b4")))
            .set_delay(Duration::from_millis(delay_ms)))
        .mount(server)
        .await;
}

async fn mount_call(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(template)
        .mount(server)
        .await;
}

fn config_for(servers: &[&MockServer]) -> NetworkConfig {
    let mut config = NetworkConfig::new(
        TEST_NETWORK_ID,
        servers.iter().map(|s| s.uri().parse().unwrap()).collect(),
    );
    config.network_name = "local_testnet".to_string();
    config.log_level = LogLevel::Error;
    config.probe_timeout_ms = 2000;
    config.call_timeout_ms = 2000;
    config
}

fn probe() -> Arc<dyn Probe> {
    Arc::new(BlockNumberProbe::new())
}

fn balance_of() -> CallRequest {
    CallRequest::eth_call(json!({"to": "0x000000000022D473030F116dDEE9F6B43aC78BA3", "data": "0x70a08231"}), Some(BlockTag::Latest))
}

#[tokio::test]
async fn test_handler_ranks_endpoints_fastest_first() {
    let server_fast = MockServer::start().await;
    let server_slow = MockServer::start().await;
    mount_probe(&server_fast, 0).await;
    mount_probe(&server_slow, 150).await;

    let handler = NetworkHandler::connect(config_for(&[&server_slow, &server_fast]), probe())
        .await
        .expect("handler init");

    let fastest = handler.fastest_rpc().expect("fastest rpc");
    assert_eq!(normalize(fastest.as_str()), normalize(&server_fast.uri()));

    let order: Vec<String> = handler.dispatcher().endpoints().snapshot().into_iter().map(|s| s.url).collect();
    assert_eq!(order.len(), 2);
    assert_eq!(normalize(&order[0]), normalize(&server_fast.uri()));
    assert_eq!(normalize(&order[1]), normalize(&server_slow.uri()));
}

#[tokio::test]
async fn test_fastest_strategy_keeps_single_endpoint() {
    let server_fast = MockServer::start().await;
    let server_slow = MockServer::start().await;
    mount_probe(&server_fast, 0).await;
    mount_probe(&server_slow, 150).await;

    let mut config = config_for(&[&server_slow, &server_fast]);
    config.strategy = Strategy::Fastest;
    let handler = NetworkHandler::connect(config, probe()).await.unwrap();

    assert_eq!(handler.dispatcher().endpoints().len(), 1);
    assert_eq!(normalize(handler.dispatcher().endpoints().first().url()), normalize(&server_fast.uri()));
}

#[tokio::test]
async fn test_call_success() {
    let server = MockServer::start().await;
    mount_probe(&server, 0).await;
    mount_call(&server, ResponseTemplate::new(200).set_body_json(build_mock_jsonrpc_response(42, json!("0xabc")))).await;

    let handler = NetworkHandler::connect(config_for(&[&server]), probe()).await.unwrap();
    let result = handler.provider().call(balance_of()).await.expect("call success");
    assert_eq!(result, json!("0xabc"));
    assert_eq!(handler.provider().get_block_number().await.unwrap(), 436);
}

#[tokio::test]
async fn test_call_fails_over_to_next_endpoint() {
    let broken = MockServer::start().await;
    let healthy = MockServer::start().await;
    // broken wins the race but cannot serve calls
    mount_probe(&broken, 0).await;
    mount_probe(&healthy, 100).await;
    mount_call(&broken, ResponseTemplate::new(500)).await;
    mount_call(&healthy, ResponseTemplate::new(200).set_body_json(build_mock_jsonrpc_response(1, json!("0x01")))).await;

    let mut config = config_for(&[&healthy, &broken]);
    config.max_concurrency = 1;
    config.dispatch.max_attempts = 1;
    let handler = NetworkHandler::connect(config, probe()).await.unwrap();
    assert_eq!(normalize(handler.dispatcher().endpoints().first().url()), normalize(&broken.uri()));

    let result = handler.provider().call(balance_of()).await.expect("fallback succeeds");
    assert_eq!(result, json!("0x01"));
}

#[tokio::test]
async fn test_call_all_fail() {
    let server = MockServer::start().await;
    mount_probe(&server, 0).await;
    mount_call(&server, ResponseTemplate::new(500)).await;

    let mut config = config_for(&[&server]);
    config.dispatch.release_delay_ms = 5;
    let handler = NetworkHandler::connect(config, probe()).await.unwrap();

    let err = handler.provider().call(balance_of()).await.err().expect("should err");
    assert!(matches!(err, FallbackError::AllAttemptsExhausted { attempts: 3, .. }), "{err:?}");
    assert!(matches!(err.root_cause(), FallbackError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_revert_is_surfaced_as_jsonrpc_error() {
    let server = MockServer::start().await;
    mount_probe(&server, 0).await;
    mount_call(&server, ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted"}
    }))).await;

    let mut config = config_for(&[&server]);
    config.dispatch.max_attempts = 0;
    let handler = NetworkHandler::connect(config, probe()).await.unwrap();

    let err = handler.provider().call(balance_of()).await.unwrap_err();
    assert!(matches!(err.root_cause(), FallbackError::JsonRpc { code: 3, .. }));
}

#[tokio::test]
async fn test_no_live_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = NetworkHandler::connect(config_for(&[&server]), probe()).await.err().expect("expected error");
    assert!(matches!(err, FallbackError::NoLiveEndpoint { candidates: 1 }));
}

#[tokio::test]
async fn test_http_transport_times_out() {
    let server = MockServer::start().await;
    mount_call(&server, ResponseTemplate::new(200)
        .set_body_json(build_mock_jsonrpc_response(1, json!("0x")))
        .set_delay(Duration::from_millis(300))).await;

    let transport = HttpTransport::new(server.uri().parse().unwrap(), Duration::from_millis(50));
    let err = transport.send(&balance_of().to_jsonrpc(1)).await.unwrap_err();
    assert!(matches!(err, FallbackError::Timeout { duration_ms: 50 }));
}

#[tokio::test]
async fn test_http_transport_times_out_on_stalled_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"jsonrpc\":")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        // headers are out, the rest of the body never comes
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let transport = HttpTransport::new(format!("http://{addr}/").parse().unwrap(), Duration::from_millis(200));
    let result = tokio::time::timeout(Duration::from_secs(2), transport.send(&balance_of().to_jsonrpc(1)))
        .await
        .expect("send returns within the call timeout");
    assert!(matches!(result, Err(FallbackError::Timeout { duration_ms: 200 })), "{result:?}");
    server.abort();
}

#[tokio::test]
async fn test_registry_connect_replace_and_remove() {
    let server = MockServer::start().await;
    mount_probe(&server, 0).await;

    let registry = NetworkRegistry::new(probe());
    let mut other = config_for(&[&server]);
    other.network_id = 7;

    let first = registry.connect(config_for(&[&server])).await.unwrap();
    registry.connect(other).await.unwrap();
    assert_eq!(registry.network_ids(), vec![7, TEST_NETWORK_ID]);

    let replacement = registry.reconfigure(TEST_NETWORK_ID).await.unwrap().expect("known network");
    assert!(!Arc::ptr_eq(&first, &replacement));
    assert!(first.dispatcher().endpoints().iter().all(|e| e.is_closed()));
    assert!(Arc::ptr_eq(&registry.get(TEST_NETWORK_ID).unwrap(), &replacement));

    assert!(registry.reconfigure(1).await.unwrap().is_none());

    let removed = registry.remove(7).expect("removed");
    assert!(removed.dispatcher().endpoints().first().is_closed());
    assert_eq!(registry.network_ids(), vec![TEST_NETWORK_ID]);
}

#[tokio::test]
async fn test_from_endpoints_skips_racing() {
    let server = MockServer::start().await;
    mount_call(&server, ResponseTemplate::new(200).set_body_json(build_mock_jsonrpc_response(1, json!("0x02")))).await;

    let transport = HttpTransport::new(server.uri().parse().unwrap(), Duration::from_secs(1));
    let endpoint = Endpoint::new(Arc::new(transport), 2).unwrap();
    let handler = NetworkHandler::from_endpoints(config_for(&[&server]), vec![endpoint]).unwrap();

    assert!(handler.latencies().is_empty());
    assert!(handler.fastest_rpc().is_none());
    assert_eq!(handler.network_name(), "local_testnet");
    assert_eq!(handler.provider().call(balance_of()).await.unwrap(), json!("0x02"));
    // no probe was mounted, so racing would have failed
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
