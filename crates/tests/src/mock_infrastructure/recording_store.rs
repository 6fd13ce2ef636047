//! `KeyValueStore` that records every write.

use super::event_log::{Event, EventLog};
use parking_lot::RwLock;
use scout_core::store::{KeyValueStore, StoreError};
use std::collections::HashMap;

/// In-memory store that appends an [`Event::Persist`] to an [`EventLog`] on every `set`.
#[derive(Debug, Default)]
pub struct RecordingStore {
    entries: RwLock<HashMap<String, String>>,
    log: EventLog,
}

impl RecordingStore {
    #[must_use]
    pub fn new(log: &EventLog) -> Self {
        Self { entries: RwLock::new(HashMap::new()), log: log.clone() }
    }

    /// Creates a store that already holds `value` under `key`, without logging it.
    #[must_use]
    pub fn with_entry(log: &EventLog, key: &str, value: &str) -> Self {
        let store = Self::new(log);
        store.entries.write().insert(key.to_string(), value.to_string());
        store
    }

    /// Current value under `key` parsed as JSON.
    #[must_use]
    pub fn json(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().get(key).and_then(|raw| serde_json::from_str(raw).ok())
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        self.log.push(Event::Persist { key: key.to_string(), value: value.to_string() });
        Ok(())
    }
}
