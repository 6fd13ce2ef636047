use futures::future::join_all;

use crate::upstream::{
    errors::SelectionError,
    prober::{ProbeResult, Prober},
};

/// Picks the fastest valid endpoint out of a candidate list.
///
/// All candidates are probed concurrently and the round waits for every probe to settle, so
/// a slow candidate delays the decision by at most one probe timeout and never cancels its
/// siblings.
#[derive(Debug, Clone)]
pub struct FastestSelector {
    prober: Prober,
}

impl FastestSelector {
    #[must_use]
    pub fn new(prober: Prober) -> Self {
        Self { prober }
    }

    #[must_use]
    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// Probes every candidate concurrently. Results keep the order of `uris`.
    pub async fn probe_all(&self, uris: &[String]) -> Vec<ProbeResult> {
        join_all(uris.iter().map(|uri| self.prober.probe(uri))).await
    }

    /// Probes every candidate and returns the lowest-latency valid one.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoValidEndpoints`] if `uris` is empty or no probe was valid.
    pub async fn select_fastest(&self, uris: &[String]) -> Result<String, SelectionError> {
        let results = self.probe_all(uris).await;
        let valid = results.iter().filter(|r| r.is_valid()).count();

        let fastest = pick_fastest(&results).ok_or(SelectionError::NoValidEndpoints { probed: uris.len() })?;

        tracing::info!(
            uri = %fastest.uri,
            latency_ms = fastest.latency_ms,
            candidates = uris.len(),
            valid = valid,
            "selected fastest endpoint"
        );

        Ok(fastest.uri.clone())
    }
}

/// Returns the valid result with the smallest latency; ties go to the earliest entry.
#[must_use]
pub fn pick_fastest(results: &[ProbeResult]) -> Option<&ProbeResult> {
    results
        .iter()
        .filter_map(|r| r.latency_ms.map(|latency| (latency, r)))
        .min_by_key(|(latency, _)| *latency)
        .map(|(_, r)| r)
}
