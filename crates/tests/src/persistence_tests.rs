//! Tests for cache persistence across dispatcher restarts.

use crate::mock_infrastructure::{dispatcher_for, EventLog, RpcMockBuilder, TEST_CHAIN_ID};
use scout_core::{
    cache::CACHE_STORAGE_KEY,
    store::{FileStore, KeyValueStore},
};
use serde_json::json;
use serial_test::serial;
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
#[serial]
async fn test_restart_reuses_persisted_choice() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("scout-store.json");

    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_canary_ok().await.mock_result("eth_blockNumber", json!("0x10")).await;

    {
        let store = Arc::new(FileStore::open(&store_path).unwrap());
        let dispatcher = dispatcher_for(TEST_CHAIN_ID, &[&a], store, TIMEOUT);
        dispatcher.dispatch(TEST_CHAIN_ID, "eth_blockNumber", vec![]).await.unwrap();
    }
    assert_eq!(log.count("A", "eth_getCode"), 1);

    let store = Arc::new(FileStore::open(&store_path).unwrap());
    let dispatcher = dispatcher_for(TEST_CHAIN_ID, &[&a], store, TIMEOUT);

    assert_eq!(dispatcher.cache().get(TEST_CHAIN_ID), Some(a.url()));
    dispatcher.dispatch(TEST_CHAIN_ID, "eth_blockNumber", vec![]).await.unwrap();

    assert_eq!(log.count("A", "eth_getCode"), 1, "restart should not probe again");
    assert_eq!(log.count("A", "eth_blockNumber"), 2);
}

#[tokio::test]
#[serial]
async fn test_corrupt_persisted_value_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("scout-store.json");
    FileStore::open(&store_path).unwrap().set(CACHE_STORAGE_KEY, "not json").unwrap();

    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_canary_ok().await.mock_result("eth_blockNumber", json!("0x10")).await;

    let store = Arc::new(FileStore::open(&store_path).unwrap());
    let dispatcher = dispatcher_for(TEST_CHAIN_ID, &[&a], store.clone(), TIMEOUT);

    assert!(dispatcher.cache().is_empty());
    dispatcher.dispatch(TEST_CHAIN_ID, "eth_blockNumber", vec![]).await.unwrap();

    let persisted = store.get(CACHE_STORAGE_KEY).unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&persisted).unwrap();
    assert_eq!(parsed, json!({ TEST_CHAIN_ID.to_string(): a.url() }));
}

#[tokio::test]
#[serial]
async fn test_other_keys_in_store_survive_updates() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("scout-store.json");
    FileStore::open(&store_path).unwrap().set("unrelated", "keep me").unwrap();

    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_canary_ok().await.mock_result("eth_blockNumber", json!("0x10")).await;

    let store = Arc::new(FileStore::open(&store_path).unwrap());
    let dispatcher = dispatcher_for(TEST_CHAIN_ID, &[&a], store, TIMEOUT);
    dispatcher.dispatch(TEST_CHAIN_ID, "eth_blockNumber", vec![]).await.unwrap();

    let reopened = FileStore::open(&store_path).unwrap();
    assert_eq!(reopened.get("unrelated").unwrap(), Some("keep me".to_string()));
    assert!(reopened.get(CACHE_STORAGE_KEY).unwrap().is_some());
}
