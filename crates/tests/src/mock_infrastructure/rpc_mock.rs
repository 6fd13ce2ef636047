//! RPC Mock Builder for JSON-RPC endpoint testing
//!
//! Wraps one mockito server per endpoint and records every request it answers into a shared
//! [`EventLog`], so tests can check which endpoints were contacted and in which order.

use super::event_log::{Event, EventLog};
use mockito::{Matcher, Mock, Request, Server, ServerGuard};
use scout_core::{
    directory::{ChainRecord, EndpointDirectory},
    store::KeyValueStore,
    types::ChainId,
    Dispatcher, DispatcherBuilder,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

/// Chain id used by most dispatcher tests.
pub const TEST_CHAIN_ID: ChainId = 100;

/// Start of the Permit2 runtime bytecode, as returned by `eth_getCode`.
pub const PERMIT2_BYTECODE: &str =
    "0x6040608081526004908136101561001557600080fd5b600090813560e01c80630d58b1db1461126c578063137c29fe14611075";

/// Builder for one mock JSON-RPC endpoint.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
    label: String,
    log: EventLog,
}

impl RpcMockBuilder {
    /// Creates a new mock endpoint named `label` with a fresh mockito server.
    pub async fn new(label: &str, log: &EventLog) -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new(), label: label.to_string(), log: log.clone() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn method_matcher(method: &str) -> Matcher {
        Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
    }

    /// Answers `method` with `status` and a body built from the request.
    async fn respond(
        &mut self,
        method: &str,
        status: usize,
        delay: Option<Duration>,
        body: impl Fn(Option<u64>) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        let log = self.log.clone();
        let label = self.label.clone();
        let method_name = method.to_string();

        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Self::method_matcher(method))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |request: &Request| {
                let id = request_id(request);
                log.push(Event::Request { endpoint: label.clone(), method: method_name.clone(), id });
                if let Some(delay) = delay {
                    std::thread::sleep(delay);
                }
                body(id).to_string().into_bytes()
            })
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Mocks a correct Permit2 `eth_getCode` canary answer.
    pub async fn mock_canary_ok(&mut self) -> &mut Self {
        self.respond("eth_getCode", 200, None, |id| success(id, json!(PERMIT2_BYTECODE))).await
    }

    /// Mocks a correct canary answer that takes `delay` to arrive.
    pub async fn mock_canary_ok_after(&mut self, delay: Duration) -> &mut Self {
        self.respond("eth_getCode", 200, Some(delay), |id| success(id, json!(PERMIT2_BYTECODE))).await
    }

    /// Mocks a node that has no code at the Permit2 address.
    pub async fn mock_canary_empty(&mut self) -> &mut Self {
        self.respond("eth_getCode", 200, None, |id| success(id, json!("0x"))).await
    }

    /// Mocks a successful `method` call returning `result`.
    pub async fn mock_result(&mut self, method: &str, result: Value) -> &mut Self {
        self.respond(method, 200, None, move |id| success(id, result.clone())).await
    }

    /// Mocks a successful `method` call that takes `delay` to answer.
    pub async fn mock_slow_result(&mut self, method: &str, delay: Duration, result: Value) -> &mut Self {
        self.respond(method, 200, Some(delay), move |id| success(id, result.clone())).await
    }

    /// Mocks a JSON-RPC error object in a 200 response.
    pub async fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let message = message.to_string();
        self.respond(method, 200, None, move |id| {
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
        })
        .await
    }

    /// Mocks an HTTP-level failure.
    pub async fn mock_http_error(&mut self, method: &str, status: usize) -> &mut Self {
        self.respond(method, status, None, |_| json!("upstream unavailable")).await
    }

    /// Mocks a 200 response whose body is not a JSON-RPC envelope.
    pub async fn mock_malformed(&mut self, method: &str) -> &mut Self {
        self.respond(method, 200, None, |_| json!(["not", "an", "envelope"])).await
    }
}

fn success(id: Option<u64>, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn request_id(request: &Request) -> Option<u64> {
    let body = request.body().ok()?;
    let parsed: Value = serde_json::from_slice(body).ok()?;
    parsed.get("id").and_then(Value::as_u64)
}

/// Builds a dispatcher whose directory maps `chain_id` to `endpoints` (in order), with short
/// timeouts suited to tests.
#[must_use]
pub fn dispatcher_for(
    chain_id: ChainId,
    endpoints: &[&RpcMockBuilder],
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
) -> Dispatcher {
    let uris = endpoints.iter().map(|e| e.url()).collect();
    let directory = EndpointDirectory::from_records(vec![ChainRecord::new(chain_id, "Test Chain", uris)]);

    DispatcherBuilder::new()
        .directory(directory)
        .store(store)
        .probe_timeout(timeout)
        .request_timeout(timeout)
        .build()
        .expect("dispatcher should build")
}
