use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    types::{JsonRpcRequest, JsonRpcResponse, RequestIdSequence},
    upstream::{errors::EndpointError, http_client::HttpClient},
};

/// A parsed response together with the wall-clock time it took.
#[derive(Debug, Clone)]
pub struct TimedResponse {
    pub response: JsonRpcResponse,
    pub latency: Duration,
}

/// Issues single JSON-RPC calls against arbitrary endpoint URIs.
///
/// Every call draws a fresh id from the shared [`RequestIdSequence`], so probes and live
/// requests of one dispatcher never reuse an id. A response carrying an `error` object is still
/// `Ok`: whether that counts as a failure is the caller's decision.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    http_client: Arc<HttpClient>,
    ids: Arc<RequestIdSequence>,
}

impl EndpointClient {
    #[must_use]
    pub fn new(http_client: Arc<HttpClient>, ids: Arc<RequestIdSequence>) -> Self {
        Self { http_client, ids }
    }

    /// Sends `method(params)` to `uri` and decodes the JSON-RPC envelope.
    ///
    /// # Errors
    ///
    /// - [`EndpointError::InvalidRequest`] if the request cannot be serialized
    /// - [`EndpointError::InvalidResponse`] if the 2xx body is not a JSON-RPC envelope
    /// - any transport error from [`HttpClient::send_request`]
    pub async fn call(
        &self,
        uri: &str,
        method: &str,
        params: &[serde_json::Value],
        timeout: Duration,
    ) -> Result<TimedResponse, EndpointError> {
        let request = JsonRpcRequest::new(method, params.to_vec(), self.ids.next_id());

        tracing::debug!(uri = %uri, method = %method, id = request.id, "sending request to endpoint");

        let body = serde_json::to_vec(&request)
            .map_err(|e| EndpointError::InvalidRequest(format!("Failed to serialize request: {e}")))?;

        let start_time = Instant::now();
        let response_bytes = self.http_client.send_request(uri, bytes::Bytes::from(body), timeout).await?;

        let response: JsonRpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| EndpointError::InvalidResponse(format!("Failed to parse response: {e}")))?;
        let latency = start_time.elapsed();

        tracing::debug!(
            uri = %uri,
            method = %method,
            latency_ms = latency.as_millis() as u64,
            has_error = response.is_error(),
            "endpoint responded"
        );

        Ok(TimedResponse { response, latency })
    }
}
