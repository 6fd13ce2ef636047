//! Integration tests for concurrent fastest-endpoint selection.

use crate::mock_infrastructure::{EventLog, RpcMockBuilder, PERMIT2_BYTECODE};
use scout_core::{
    types::RequestIdSequence,
    upstream::{Canary, EndpointClient, FastestSelector, HttpClient, Prober, ResultPredicate, SelectionError},
};
use serde_json::json;
use serial_test::serial;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

fn selector(canary: Canary, timeout: Duration) -> FastestSelector {
    let client = EndpointClient::new(Arc::new(HttpClient::new().unwrap()), Arc::new(RequestIdSequence::new()));
    FastestSelector::new(Prober::new(client, canary, timeout))
}

#[tokio::test]
#[serial]
async fn test_fastest_valid_endpoint_wins() {
    let log = EventLog::new();
    let mut slow = RpcMockBuilder::new("slow", &log).await;
    slow.mock_canary_ok_after(Duration::from_millis(300)).await;
    let mut fast = RpcMockBuilder::new("fast", &log).await;
    fast.mock_canary_ok().await;
    let mut wrong = RpcMockBuilder::new("wrong", &log).await;
    wrong.mock_canary_empty().await;

    let selector = selector(Canary::permit2_code(), Duration::from_secs(2));
    let uris = vec![slow.url(), fast.url(), wrong.url()];

    let started = Instant::now();
    let winner = selector.select_fastest(&uris).await.unwrap();

    assert_eq!(winner, fast.url());
    // Selection waits for every probe, including the slow one.
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(log.endpoints_called("eth_getCode").len(), 3);
}

#[tokio::test]
#[serial]
async fn test_probe_results_keep_input_order() {
    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_canary_ok_after(Duration::from_millis(150)).await;
    let mut b = RpcMockBuilder::new("B", &log).await;
    b.mock_canary_empty().await;

    let selector = selector(Canary::permit2_code(), Duration::from_secs(2));
    let results = selector.probe_all(&[a.url(), b.url(), "http://127.0.0.1:1".to_string()]).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].uri, a.url());
    assert!(results[0].latency_ms.is_some_and(|ms| ms >= 150));
    assert_eq!(results[1].uri, b.url());
    assert!(!results[1].is_valid());
    assert!(!results[2].is_valid());
}

#[tokio::test]
#[serial]
async fn test_probe_timeout_marks_endpoint_invalid() {
    let log = EventLog::new();
    let mut stalled = RpcMockBuilder::new("stalled", &log).await;
    stalled.mock_canary_ok_after(Duration::from_millis(800)).await;
    let mut ok = RpcMockBuilder::new("ok", &log).await;
    ok.mock_canary_ok().await;

    let selector = selector(Canary::permit2_code(), Duration::from_millis(200));

    let started = Instant::now();
    let winner = selector.select_fastest(&[stalled.url(), ok.url()]).await.unwrap();

    assert_eq!(winner, ok.url());
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_empty_candidate_list_has_no_valid_endpoint() {
    let selector = selector(Canary::permit2_code(), Duration::from_secs(1));

    let result = selector.select_fastest(&[]).await;

    assert_eq!(result.unwrap_err(), SelectionError::NoValidEndpoints { probed: 0 });
}

#[tokio::test]
#[serial]
async fn test_custom_canary_predicate() {
    let log = EventLog::new();
    let mut behind = RpcMockBuilder::new("behind", &log).await;
    behind.mock_result("eth_blockNumber", json!("0x0")).await;
    let mut synced = RpcMockBuilder::new("synced", &log).await;
    synced.mock_result("eth_blockNumber", json!("0x12a05f200")).await;

    let canary = Canary::new("eth_blockNumber", vec![], ResultPredicate::HexAtLeast(1_000_000));
    let selector = selector(canary, Duration::from_secs(2));

    let winner = selector.select_fastest(&[behind.url(), synced.url()]).await.unwrap();

    assert_eq!(winner, synced.url());
}

#[tokio::test]
#[serial]
async fn test_canary_mismatch_everywhere() {
    let log = EventLog::new();
    let mut a = RpcMockBuilder::new("A", &log).await;
    a.mock_result("eth_getCode", json!(PERMIT2_BYTECODE.replacen("0x60", "0x5b", 1))).await;
    let mut b = RpcMockBuilder::new("B", &log).await;
    b.mock_http_error("eth_getCode", 429).await;

    let selector = selector(Canary::permit2_code(), Duration::from_secs(2));

    let result = selector.select_fastest(&[a.url(), b.url()]).await;

    assert_eq!(result.unwrap_err(), SelectionError::NoValidEndpoints { probed: 2 });
}

#[tokio::test]
#[serial]
async fn test_other_contract_at_permit2_address_loses() {
    let log = EventLog::new();
    let mut foreign = RpcMockBuilder::new("foreign", &log).await;
    foreign.mock_result("eth_getCode", json!("0x6080604052348015600f57600080fd5b506004361060285760003560e01c")).await;
    let mut permit2 = RpcMockBuilder::new("permit2", &log).await;
    permit2.mock_canary_ok_after(Duration::from_millis(150)).await;

    let selector = selector(Canary::permit2_code(), Duration::from_secs(2));

    let results = selector.probe_all(&[foreign.url(), permit2.url()]).await;
    let winner = selector.select_fastest(&[foreign.url(), permit2.url()]).await.unwrap();

    assert!(!results[0].is_valid());
    assert!(results[1].is_valid());
    assert_eq!(winner, permit2.url());
}
