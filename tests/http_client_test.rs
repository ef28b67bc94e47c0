use faucet_dispatch::application::registry::Registry;
use faucet_dispatch::config::{ClientConfig, DestinationConfig, FaucetConfig, HttpClientConfig};
use faucet_dispatch::domain::notification::Denomination;
use faucet_dispatch::domain::ports::DestinationClient;
use faucet_dispatch::domain::work::{DestinationId, Payout};
use faucet_dispatch::error::FaucetError;
use faucet_dispatch::infrastructure::http::HttpDestinationClient;
use faucet_dispatch::infrastructure::in_memory::InMemoryNotificationSink;
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

fn commit_body(chain_id: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "signed_header": {
                "header": { "chain_id": chain_id, "height": "1042" },
                "commit": { "height": "1042" }
            },
            "canonical": true
        }
    })
    .to_string()
}

fn http_config(server: &Server, chain_id: Option<&str>, account: Option<&str>) -> HttpClientConfig {
    HttpClientConfig {
        rpc: server.url(),
        broadcast: format!("{}/multisend", server.url()),
        account: account.map(str::to_string),
        chain_id: chain_id.map(str::to_string),
        gas_prices: "0.0025uumee".to_string(),
    }
}

fn denom() -> Denomination {
    Denomination {
        base: "uumee".to_string(),
        display: "umee".to_string(),
        exponent: 6,
    }
}

#[tokio::test]
async fn test_connect_resolves_chain_id() {
    let mut server = Server::new_async().await;
    let commit = server
        .mock("GET", "/commit")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(commit_body("umee-1"))
        .create_async()
        .await;

    let config = http_config(&server, Some("umee-1"), Some("umee1faucet"));
    let client = HttpDestinationClient::connect(DestinationId::from("umee"), &config, &denom())
        .await
        .unwrap();

    assert_eq!(client.chain_id(), "umee-1");
    assert_eq!(client.resolve_account().await.unwrap(), "umee1faucet");
    commit.assert_async().await;
}

#[tokio::test]
async fn test_connect_rejects_chain_mismatch() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(commit_body("umee-2"))
        .create_async()
        .await;

    let config = http_config(&server, Some("umee-1"), Some("umee1faucet"));
    let result =
        HttpDestinationClient::connect(DestinationId::from("umee"), &config, &denom()).await;

    assert!(matches!(result, Err(FaucetError::ConfigError(_))));
}

#[tokio::test]
async fn test_connect_non_success_status_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(503)
        .create_async()
        .await;

    let config = http_config(&server, None, Some("umee1faucet"));
    let result =
        HttpDestinationClient::connect(DestinationId::from("umee"), &config, &denom()).await;

    match result {
        Err(FaucetError::ProtocolError(message)) => assert!(message.contains("503")),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_malformed_commit_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(r#"{"result": {"signed_header": {}}}"#)
        .create_async()
        .await;

    let config = http_config(&server, None, Some("umee1faucet"));
    let result =
        HttpDestinationClient::connect(DestinationId::from("umee"), &config, &denom()).await;

    assert!(matches!(result, Err(FaucetError::ProtocolError(_))));
}

#[tokio::test]
async fn test_send_batch_broadcasts_multi_send() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(commit_body("umee-1"))
        .create_async()
        .await;
    let broadcast = server
        .mock("POST", "/multisend")
        .match_body(Matcher::PartialJson(json!({
            "chain_id": "umee-1",
            "gas_prices": "0.0025uumee",
        })))
        .with_status(200)
        .with_body(r#"{"code": 0, "txhash": "ABC123"}"#)
        .expect(1)
        .create_async()
        .await;

    let config = http_config(&server, None, Some("umee1faucet"));
    let destination = DestinationId::from("umee");
    let client = HttpDestinationClient::connect(destination.clone(), &config, &denom())
        .await
        .unwrap();

    let payouts = vec![Payout::new("umee1r1", 10), Payout::new("umee1r2", 20)];
    client.send_batch(&destination, &payouts).await.unwrap();
    broadcast.assert_async().await;
}

#[tokio::test]
async fn test_send_batch_rejected_code_is_transfer_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(commit_body("umee-1"))
        .create_async()
        .await;
    server
        .mock("POST", "/multisend")
        .with_status(200)
        .with_body(r#"{"code": 5, "raw_log": "insufficient funds"}"#)
        .create_async()
        .await;

    let config = http_config(&server, None, Some("umee1faucet"));
    let destination = DestinationId::from("umee");
    let client = HttpDestinationClient::connect(destination.clone(), &config, &denom())
        .await
        .unwrap();

    let result = client
        .send_batch(&destination, &[Payout::new("umee1r1", 10)])
        .await;
    match result {
        Err(FaucetError::TransferError(message)) => {
            assert!(message.contains("insufficient funds"))
        }
        other => panic!("expected transfer error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_send_batch_server_error_is_transfer_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(commit_body("umee-1"))
        .create_async()
        .await;
    server
        .mock("POST", "/multisend")
        .with_status(502)
        .create_async()
        .await;

    let config = http_config(&server, None, Some("umee1faucet"));
    let destination = DestinationId::from("umee");
    let client = HttpDestinationClient::connect(destination.clone(), &config, &denom())
        .await
        .unwrap();

    let result = client
        .send_batch(&destination, &[Payout::new("umee1r1", 10)])
        .await;
    assert!(matches!(result, Err(FaucetError::TransferError(_))));
}

#[tokio::test]
async fn test_send_batch_without_account_never_broadcasts() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(200)
        .with_body(commit_body("umee-1"))
        .create_async()
        .await;
    let broadcast = server
        .mock("POST", "/multisend")
        .expect(0)
        .create_async()
        .await;

    let config = http_config(&server, None, None);
    let destination = DestinationId::from("umee");
    let client = HttpDestinationClient::connect(destination.clone(), &config, &denom())
        .await
        .unwrap();

    let result = client
        .send_batch(&destination, &[Payout::new("umee1r1", 10)])
        .await;
    assert!(matches!(result, Err(FaucetError::NoAccount(_))));
    broadcast.assert_async().await;
}

#[tokio::test]
async fn test_registry_fails_when_node_unreachable() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/commit")
        .with_status(500)
        .create_async()
        .await;

    let config = FaucetConfig {
        tick_interval_ms: 100,
        queue_capacity: 10,
        notify_failures: false,
        denom: denom(),
        destinations: vec![DestinationConfig {
            prefix: DestinationId::from("umee"),
            client: ClientConfig::Http(http_config(&server, None, Some("umee1faucet"))),
        }],
    };

    let result = Registry::from_config(&config, Arc::new(InMemoryNotificationSink::new())).await;
    assert!(matches!(result, Err(FaucetError::ProtocolError(_))));
}
