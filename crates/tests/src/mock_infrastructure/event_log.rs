//! Ordered log of everything observable from outside the dispatcher.

use parking_lot::Mutex;
use std::sync::Arc;

/// One observed side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An endpoint received a request.
    Request { endpoint: String, method: String, id: Option<u64> },
    /// The cache wrote `value` under `key`.
    Persist { key: String, value: String },
}

/// Shared, ordered event log. Cloning shares the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// `(endpoint, method)` of every request, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Request { endpoint, method, .. } => Some((endpoint.clone(), method.clone())),
                Event::Persist { .. } => None,
            })
            .collect()
    }

    /// Endpoints that received `method`, in arrival order.
    #[must_use]
    pub fn endpoints_called(&self, method: &str) -> Vec<String> {
        self.requests().into_iter().filter(|(_, m)| m == method).map(|(endpoint, _)| endpoint).collect()
    }

    /// Number of `method` requests `endpoint` received.
    #[must_use]
    pub fn count(&self, endpoint: &str, method: &str) -> usize {
        self.requests().iter().filter(|(e, m)| e == endpoint && m == method).count()
    }

    /// Request ids in arrival order.
    #[must_use]
    pub fn request_ids(&self) -> Vec<u64> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Request { id, .. } => *id,
                Event::Persist { .. } => None,
            })
            .collect()
    }

    /// Persisted values, in write order.
    #[must_use]
    pub fn persisted(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Persist { value, .. } => Some(value.clone()),
                Event::Request { .. } => None,
            })
            .collect()
    }

    /// Position of the first event matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.lock().iter().position(predicate)
    }
}
