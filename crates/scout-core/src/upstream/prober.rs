use std::{sync::Arc, time::Duration};

use crate::upstream::{canary::Canary, endpoint::EndpointClient, errors::EndpointError};

/// Deadline for a single canary call.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of probing one endpoint.
///
/// `latency_ms` is `None` when the probe was invalid for any reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub uri: String,
    pub latency_ms: Option<u64>,
}

impl ProbeResult {
    #[must_use]
    pub fn valid(uri: impl Into<String>, latency_ms: u64) -> Self {
        Self { uri: uri.into(), latency_ms: Some(latency_ms) }
    }

    #[must_use]
    pub fn invalid(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), latency_ms: None }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latency_ms.is_some()
    }
}

/// Sends the canary call to one endpoint and times it.
#[derive(Debug, Clone)]
pub struct Prober {
    client: EndpointClient,
    canary: Arc<Canary>,
    timeout: Duration,
}

impl Prober {
    #[must_use]
    pub fn new(client: EndpointClient, canary: Canary, timeout: Duration) -> Self {
        Self { client, canary: Arc::new(canary), timeout }
    }

    #[must_use]
    pub fn canary(&self) -> &Canary {
        &self.canary
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes `uri`. Never fails: every failure mode maps to an invalid [`ProbeResult`].
    pub async fn probe(&self, uri: &str) -> ProbeResult {
        match self.check(uri).await {
            Ok(latency) => {
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                tracing::debug!(uri = %uri, latency_ms = latency_ms, "probe succeeded");
                ProbeResult::valid(uri, latency_ms)
            }
            Err(e) => {
                tracing::debug!(
                    uri = %uri,
                    error = %e,
                    kind = e.kind(),
                    category = e.rpc_category().map(|c| c.as_str()),
                    "probe failed"
                );
                ProbeResult::invalid(uri)
            }
        }
    }

    /// Runs the canary call and validates the answer.
    ///
    /// # Errors
    ///
    /// Returns the transport error, [`EndpointError::RpcError`] for an `error` object,
    /// [`EndpointError::InvalidResponse`] for a missing result, or
    /// [`EndpointError::CanaryMismatch`] when the predicate rejects the result.
    pub async fn check(&self, uri: &str) -> Result<Duration, EndpointError> {
        let timed = self.client.call(uri, &self.canary.method, &self.canary.params, self.timeout).await?;

        if let Some(error) = timed.response.error {
            return Err(EndpointError::RpcError(error.code, error.message));
        }

        let result = timed
            .response
            .result
            .ok_or_else(|| EndpointError::InvalidResponse("response has no result".to_string()))?;

        self.canary.check(&result).map_err(EndpointError::CanaryMismatch)?;

        Ok(timed.latency)
    }
}
