//! Core type definitions for the JSON-RPC envelope and request correlation.
//!
//! # Type Categories
//!
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: JSON-RPC 2.0 wire types
//! - [`RequestIdSequence`]: per-dispatcher monotonic request ids
//! - [`ChainId`]: integer chain identifier

use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    sync::atomic::{AtomicU64, Ordering},
};

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for the JSON-RPC version.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// Integer key identifying a blockchain network (`1` for Ethereum mainnet, `100` for Gnosis).
pub type ChainId = u64;

/// JSON-RPC 2.0 request structure.
///
/// Every outbound call (canary probes included) carries a fresh `id` taken from the
/// owning dispatcher's [`RequestIdSequence`].
///
/// # Example
///
/// ```
/// use scout_core::types::JsonRpcRequest;
///
/// let request = JsonRpcRequest::new("eth_blockNumber", vec![], 7);
///
/// assert_eq!(request.method, "eth_blockNumber");
/// assert_eq!(request.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    pub params: Vec<serde_json::Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with zero allocation for the version string.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id }
    }
}

/// JSON-RPC 2.0 response structure.
///
/// A response carries either a `result` or an `error`. Upstreams are not always strict about
/// this, so both are optional and every field tolerates being absent.
///
/// # Example
///
/// ```
/// use scout_core::types::JsonRpcResponse;
/// use serde_json::json;
///
/// let response: JsonRpcResponse =
///     serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"})).unwrap();
///
/// assert!(!response.is_error());
/// assert_eq!(response.result_str(), Some("0x10"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "default_version")]
    pub jsonrpc: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: serde_json::Value,
}

fn default_version() -> Cow<'static, str> {
    JSONRPC_VERSION_COW
}

impl JsonRpcResponse {
    /// Returns `true` if the upstream populated the top-level `error` object.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the result as a string slice when it is a JSON string.
    #[must_use]
    pub fn result_str(&self) -> Option<&str> {
        self.result.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// JSON-RPC 2.0 error object.
///
/// Standard codes follow the JSON-RPC 2.0 convention (`-32700` parse error, `-32600` invalid
/// request, `-32601` method not found, `-32602` invalid params, `-32603` internal error,
/// `-32000..=-32099` server-defined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Monotonic request id source scoped to one dispatcher instance.
///
/// Ids start at `1` and are never reused within the sequence's lifetime.
#[derive(Debug)]
pub struct RequestIdSequence {
    next: AtomicU64,
}

impl RequestIdSequence {
    #[must_use]
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RequestIdSequence {
    fn default() -> Self {
        Self::new()
    }
}
