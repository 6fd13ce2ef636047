//! Persistent chain → fastest-endpoint cache.
//!
//! The cache is the only component that writes to the injected [`KeyValueStore`]. Every
//! mutation ([`set`](FastestEndpointCache::set), [`evict`](FastestEndpointCache::evict),
//! [`clear`](FastestEndpointCache::clear)) serializes the whole map and stores it under
//! [`CACHE_STORAGE_KEY`] while still holding the write lock, so the persisted snapshots follow
//! the order of the in-memory mutations.
//!
//! # Persisted Format
//!
//! ```json
//! {"1": "https://eth.llamarpc.com", "100": "https://rpc.gnosischain.com"}
//! ```
//!
//! Persistence failures are logged and swallowed: the in-memory map stays authoritative for the
//! rest of the process lifetime.

use crate::{
    store::{KeyValueStore, StoreError},
    types::ChainId,
};
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, error, info, warn};

/// Storage key holding the serialized chain → uri map.
pub const CACHE_STORAGE_KEY: &str = "fastestRpcs";

/// Map of chain id to the endpoint last known to be the fastest valid one.
#[derive(Debug)]
pub struct FastestEndpointCache {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<BTreeMap<ChainId, String>>,
}

impl FastestEndpointCache {
    /// Creates the cache and loads any previously persisted entries.
    ///
    /// A missing key starts empty. An unreadable store or a corrupt value is logged and also
    /// starts empty; the next mutation overwrites the corrupt value.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(CACHE_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<BTreeMap<ChainId, String>>(&raw) {
                Ok(entries) => {
                    info!(entries = entries.len(), "loaded fastest endpoint cache");
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "ignoring corrupt fastest endpoint cache");
                    BTreeMap::new()
                }
            },
            Ok(None) => {
                debug!("no persisted fastest endpoint cache, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                error!(error = %e, "failed to read fastest endpoint cache");
                BTreeMap::new()
            }
        };

        Self { store, entries: RwLock::new(entries) }
    }

    /// Returns the cached endpoint for `chain_id`.
    #[must_use]
    pub fn get(&self, chain_id: ChainId) -> Option<String> {
        self.entries.read().get(&chain_id).cloned()
    }

    /// Records `uri` as the fastest endpoint for `chain_id` and persists the map.
    pub fn set(&self, chain_id: ChainId, uri: &str) {
        let mut entries = self.entries.write();
        let previous = entries.insert(chain_id, uri.to_string());
        if previous.as_deref() == Some(uri) {
            return;
        }

        info!(chain_id = chain_id, uri = %uri, "cached fastest endpoint");
        self.persist(&entries);
    }

    /// Removes the entry for `chain_id` and persists the map. Returns the removed endpoint.
    pub fn evict(&self, chain_id: ChainId) -> Option<String> {
        let mut entries = self.entries.write();
        let removed = entries.remove(&chain_id);

        if let Some(uri) = &removed {
            info!(chain_id = chain_id, uri = %uri, "evicted cached endpoint");
            self.persist(&entries);
        }

        removed
    }

    /// Removes every entry and persists the empty map.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();

        info!(removed = count, "cleared fastest endpoint cache");
        self.persist(&entries);
    }

    /// Returns a copy of all entries, ordered by chain id.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<ChainId, String> {
        self.entries.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn persist(&self, entries: &BTreeMap<ChainId, String>) {
        if let Err(e) = self.try_persist(entries) {
            error!(error = %e, "failed to persist fastest endpoint cache");
        }
    }

    fn try_persist(&self, entries: &BTreeMap<ChainId, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries)?;
        self.store.set(CACHE_STORAGE_KEY, &raw)
    }
}
