use carrier_tracker::client::api::parse_carrier_cargo;
use carrier_tracker::config::ApiConfig;
use carrier_tracker::{CargoItem, CompanionClient, TrackerError};
use mockito::Server;
use serde_json::json;

fn api_config(server_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: server_url.to_string(),
        request_timeout_seconds: 5,
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn test_profile_with_cargo_returns_inventory() {
    let mut server = Server::new_async().await;
    let body = json!({
        "commander": {"name": "CMDR Test"},
        "fleet_carrier": {
            "name": "K7Q-BQL",
            "cargo": {
                "inventory": [
                    {"name": "Tritium", "quantity": 120, "value": 5000},
                    {"name": "Steel", "quantity": 3000}
                ]
            }
        }
    });
    let mock = server
        .mock("GET", "/v4/profile")
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = CompanionClient::new(&api_config(&server.url())).expect("client");
    let cargo = client.get_carrier_cargo("token-1").await.expect("cargo");

    assert_eq!(cargo, vec![CargoItem::new("Tritium", 120), CargoItem::new("Steel", 3000)]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_maps_to_credential_expired() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/profile")
        .with_status(401)
        .with_body("expired")
        .create_async()
        .await;

    let client = CompanionClient::new(&api_config(&server.url())).expect("client");
    let err = client.get_carrier_cargo("stale").await.expect_err("should fail");
    assert!(matches!(err, TrackerError::CredentialExpired), "got {err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/profile")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = CompanionClient::new(&api_config(&server.url())).expect("client");
    let err = client.get_carrier_cargo("token").await.expect_err("should fail");
    assert!(matches!(err, TrackerError::TransientApi(_)), "got {err:?}");
    assert!(err.is_transient());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_connection_failure_is_transient() {
    let client = CompanionClient::new(&api_config("http://127.0.0.1:9")).expect("client");
    let err = client.get_carrier_cargo("token").await.expect_err("should fail");
    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn test_api_log_file_records_calls() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/profile")
        .with_status(200)
        .with_body(json!({"fleet_carrier": {}}).to_string())
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("temp dir");
    let log_path = dir.path().join("api_debug.log");
    let config = ApiConfig {
        api_logging: true,
        api_log_file: log_path.to_str().unwrap().to_string(),
        ..api_config(&server.url())
    };

    let client = CompanionClient::new(&config).expect("client");
    client.get_carrier_cargo("token").await.expect("cargo");

    let log = std::fs::read_to_string(&log_path).expect("log written");
    assert!(log.contains("Method: GET"));
    assert!(log.contains("Response Status: 200"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_api_log_write_failure_does_not_fail_the_call() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/profile")
        .with_status(200)
        .with_body(json!({"fleet_carrier": {"cargo": {"inventory": []}}}).to_string())
        .create_async()
        .await;

    // Opens fine, every write fails with ENOSPC
    let client = CompanionClient::new(&ApiConfig {
        api_logging: true,
        api_log_file: "/dev/full".to_string(),
        ..api_config(&server.url())
    })
    .expect("client");

    let cargo = client.get_carrier_cargo("token").await.expect("cargo");
    assert!(cargo.is_empty());
}

#[test]
fn test_missing_nested_fields() {
    assert!(parse_carrier_cargo(r#"{"fleet_carrier": {}}"#).expect("empty cargo").is_empty());
    assert!(
        parse_carrier_cargo(r#"{"fleet_carrier": {"cargo": {}}}"#)
            .expect("empty inventory")
            .is_empty()
    );

    let err = parse_carrier_cargo(r#"{"commander": {}}"#).expect_err("no carrier");
    assert!(matches!(err, TrackerError::MalformedResponse(_)));

    let err = parse_carrier_cargo("not json").expect_err("garbage");
    assert!(matches!(err, TrackerError::MalformedResponse(_)));
    assert!(err.is_transient());

    let err = parse_carrier_cargo(r#"{"fleet_carrier": {"cargo": {"inventory": [{"name": "Steel"}]}}}"#)
        .expect_err("item without quantity");
    assert!(matches!(err, TrackerError::MalformedResponse(_)));
}
