//! Request dispatch with cached fastest-endpoint routing and ordered failover.
//!
//! # Dispatch Round
//!
//! ```text
//! dispatch(chain_id, method, params)
//!       │
//!       ├─ chain_id == 0 ──► InvalidChainId
//!       ▼
//!   resolve ── cache hit ──────────────────────┐
//!       │ miss                                  │
//!       ▼                                       │
//!   select_fastest(endpoints_for(chain_id))     │
//!       │ winner cached                         │
//!       ▼                                       ▼
//!   send to primary ── Ok ──► response (RPC error objects included)
//!       │ Err
//!       ▼
//!   evict cache entry
//!       │
//!       ▼
//!   for uri in endpoints_for(chain_id), skipping the primary, one at a time:
//!       send ── Ok ──► cache uri, return response
//!       │ Err
//!       └─► next
//!       │
//!       ▼
//!   AllEndpointsFailed (no cache entry left)
//! ```
//!
//! No endpoint is contacted twice within one round. A 2xx response with a JSON-RPC `error`
//! object is a valid answer about the call, not about the endpoint: it is logged and returned.

mod builder;
mod errors;

pub use builder::{BuilderError, DispatcherBuilder};
pub use errors::DispatchError;

use crate::{
    cache::FastestEndpointCache,
    directory::EndpointDirectory,
    types::{ChainId, JsonRpcResponse},
    upstream::{EndpointClient, EndpointError, FastestSelector, RpcErrorCategory, SelectionError},
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Routes JSON-RPC calls for a chain to its fastest valid endpoint.
///
/// Built with [`DispatcherBuilder`]. The dispatcher is `Send + Sync` and meant to be shared
/// behind an `Arc`.
pub struct Dispatcher {
    directory: Arc<EndpointDirectory>,
    cache: FastestEndpointCache,
    selector: FastestSelector,
    client: EndpointClient,
    request_timeout: Duration,
    resolution_locks: Mutex<HashMap<ChainId, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chains", &self.directory.len())
            .field("cached", &self.cache.len())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub(crate) fn new(
        directory: Arc<EndpointDirectory>,
        cache: FastestEndpointCache,
        selector: FastestSelector,
        client: EndpointClient,
        request_timeout: Duration,
    ) -> Self {
        Self { directory, cache, selector, client, request_timeout, resolution_locks: Mutex::new(HashMap::new()) }
    }

    /// Sends `method(params)` to the fastest endpoint of `chain_id`, failing over in directory
    /// order if that endpoint does not answer.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InvalidChainId`] for chain id `0`
    /// - [`DispatchError::NoEndpoints`] if the directory has nothing to offer
    /// - [`DispatchError::NoValidEndpoints`] if no candidate passed the canary probe
    /// - [`DispatchError::AllEndpointsFailed`] if the primary and every alternate failed
    pub async fn dispatch(
        &self,
        chain_id: ChainId,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<JsonRpcResponse, DispatchError> {
        if chain_id == 0 {
            return Err(DispatchError::InvalidChainId);
        }

        let primary = self.resolve(chain_id).await?;
        debug!(chain_id = chain_id, uri = %primary, method = %method, "dispatching request");

        match self.send(chain_id, &primary, method, &params).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(
                    chain_id = chain_id,
                    uri = %primary,
                    method = %method,
                    error = %e,
                    kind = e.kind(),
                    "primary endpoint failed, failing over"
                );
                self.fail_over(chain_id, &primary, method, &params).await
            }
        }
    }

    /// Returns the endpoint `dispatch` would use first for `chain_id`, probing if nothing is
    /// cached.
    ///
    /// Concurrent callers for the same uncached chain share one probe round.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidChainId`], [`DispatchError::NoEndpoints`] or
    /// [`DispatchError::NoValidEndpoints`].
    pub async fn resolve(&self, chain_id: ChainId) -> Result<String, DispatchError> {
        if chain_id == 0 {
            return Err(DispatchError::InvalidChainId);
        }

        if let Some(uri) = self.cache.get(chain_id) {
            debug!(chain_id = chain_id, uri = %uri, "cache hit");
            return Ok(uri);
        }

        let lock = self.resolution_lock(chain_id);
        let resolved = {
            let _guard = lock.lock().await;
            self.probe_and_cache(chain_id).await
        };
        self.release_resolution_lock(chain_id, lock);

        resolved
    }

    /// Runs one probe round for `chain_id` and caches the winner. Caller holds the chain's lock.
    async fn probe_and_cache(&self, chain_id: ChainId) -> Result<String, DispatchError> {
        // Another task may have finished a probe round while we waited.
        if let Some(uri) = self.cache.get(chain_id) {
            return Ok(uri);
        }

        let candidates = self.candidates(chain_id)?;
        debug!(chain_id = chain_id, candidates = candidates.len(), "probing candidates");

        let fastest = self.selector.select_fastest(&candidates).await.map_err(|e| match e {
            SelectionError::NoValidEndpoints { probed } => {
                warn!(chain_id = chain_id, probed = probed, "no endpoint passed the canary probe");
                DispatchError::NoValidEndpoints { chain_id }
            }
        })?;

        self.cache.set(chain_id, &fastest);
        Ok(fastest)
    }

    /// Evicts the failed primary, then tries every other candidate sequentially.
    async fn fail_over(
        &self,
        chain_id: ChainId,
        failed: &str,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<JsonRpcResponse, DispatchError> {
        self.cache.evict(chain_id);

        let candidates = self.candidates(chain_id)?;

        for uri in candidates.iter().filter(|uri| uri.as_str() != failed) {
            match self.send(chain_id, uri, method, params).await {
                Ok(response) => {
                    info!(chain_id = chain_id, uri = %uri, failed = %failed, "failover succeeded");
                    self.cache.set(chain_id, uri);
                    return Ok(response);
                }
                Err(e) => {
                    warn!(chain_id = chain_id, uri = %uri, error = %e, kind = e.kind(), "alternate endpoint failed");
                }
            }
        }

        warn!(chain_id = chain_id, candidates = candidates.len(), "all endpoints failed");
        Err(DispatchError::AllEndpointsFailed { chain_id })
    }

    /// One live request. RPC `error` objects are logged and count as success.
    async fn send(
        &self,
        chain_id: ChainId,
        uri: &str,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<JsonRpcResponse, EndpointError> {
        let timed = self.client.call(uri, method, params, self.request_timeout).await?;

        if let Some(error) = &timed.response.error {
            let category = RpcErrorCategory::from_code_and_message(error.code, &error.message);
            warn!(
                chain_id = chain_id,
                uri = %uri,
                method = %method,
                code = error.code,
                message = %error.message,
                category = category.as_str(),
                "endpoint returned rpc error, passing through"
            );
        }

        Ok(timed.response)
    }

    fn candidates(&self, chain_id: ChainId) -> Result<Vec<String>, DispatchError> {
        self.directory.endpoints_for(chain_id).map_err(|e| {
            warn!(chain_id = chain_id, error = %e, "directory has no endpoints");
            DispatchError::NoEndpoints { chain_id }
        })
    }

    fn resolution_lock(&self, chain_id: ChainId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.resolution_locks.lock();
        Arc::clone(locks.entry(chain_id).or_default())
    }

    /// Drops the caller's handle and removes the map entry once nobody else holds or waits on it.
    fn release_resolution_lock(&self, chain_id: ChainId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.resolution_locks.lock();
        drop(lock);
        if locks.get(&chain_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&chain_id);
        }
    }

    /// The persistent fastest-endpoint cache.
    #[must_use]
    pub fn cache(&self) -> &FastestEndpointCache {
        &self.cache
    }

    #[must_use]
    pub fn directory(&self) -> &EndpointDirectory {
        &self.directory
    }

    #[must_use]
    pub fn selector(&self) -> &FastestSelector {
        &self.selector
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
