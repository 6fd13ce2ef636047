//! String-keyed persistence backends for the fastest-endpoint cache.
//!
//! The cache only needs `get`/`set` on string keys, so backends stay tiny:
//!
//! - [`MemoryStore`]: process-local map, lost on exit (default)
//! - [`FileStore`]: JSON object of key → value on disk, rewritten on every `set`

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Minimal string-keyed storage capability injected into the cache.
///
/// Implementations are shared across tasks and must synchronize internally.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
