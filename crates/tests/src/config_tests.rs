//! Tests for layered configuration and config-driven dispatcher construction.

use crate::mock_infrastructure::{EventLog, RpcMockBuilder};
use scout_core::{
    config::{AppConfig, StoreBackend},
    DispatcherBuilder,
};
use serde_json::json;
use serial_test::serial;
use std::{io::Write, time::Duration};
use tempfile::{NamedTempFile, TempDir};

#[test]
#[serial]
fn test_environment_overrides_file() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    write!(
        file,
        r#"
[dispatch]
probe_timeout_ms = 4000
request_timeout_ms = 6000
"#
    )
    .unwrap();

    std::env::set_var("SCOUT__DISPATCH__PROBE_TIMEOUT_MS", "1500");
    let config = AppConfig::from_file(file.path());
    std::env::remove_var("SCOUT__DISPATCH__PROBE_TIMEOUT_MS");

    let config = config.unwrap();
    assert_eq!(config.probe_timeout(), Duration::from_millis(1500));
    assert_eq!(config.request_timeout(), Duration::from_millis(6000));
}

#[test]
#[serial]
fn test_environment_selects_store_backend() {
    std::env::set_var("SCOUT__STORE__BACKEND", "file");
    std::env::set_var("SCOUT__STORE__PATH", "/tmp/scout-env-store.json");
    let config = AppConfig::from_file("/nonexistent/scout.toml");
    std::env::remove_var("SCOUT__STORE__BACKEND");
    std::env::remove_var("SCOUT__STORE__PATH");

    let config = config.unwrap();
    assert_eq!(config.store.backend, StoreBackend::File);
    assert_eq!(config.store.path.to_string_lossy(), "/tmp/scout-env-store.json");
    assert!(config.validate().is_ok());
}

#[tokio::test]
#[serial]
async fn test_config_file_end_to_end() {
    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_canary_ok().await.mock_result("eth_blockNumber", json!("0x2a")).await;

    let temp_dir = TempDir::new().unwrap();
    let registry_path = temp_dir.path().join("chains.json");
    let store_path = temp_dir.path().join("store.json");
    let config_path = temp_dir.path().join("scout.toml");

    std::fs::write(&registry_path, json!([{"chainId": 31337, "name": "Local", "rpc": [a.url()]}]).to_string())
        .unwrap();
    std::fs::write(
        &config_path,
        format!(
            r#"
[directory]
path = "{}"
include_builtin = false

[store]
backend = "file"
path = "{}"

[dispatch]
probe_timeout_ms = 2000
request_timeout_ms = 2000
"#,
            registry_path.display(),
            store_path.display()
        ),
    )
    .unwrap();

    let config = AppConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let dispatcher = DispatcherBuilder::from_config(&config).unwrap().build().unwrap();
    let response = dispatcher.dispatch(31337, "eth_blockNumber", vec![]).await.unwrap();

    assert_eq!(response.result_str(), Some("0x2a"));
    assert_eq!(dispatcher.directory().len(), 1);
    assert!(std::fs::read_to_string(&store_path).unwrap().contains(&a.url()));
}
