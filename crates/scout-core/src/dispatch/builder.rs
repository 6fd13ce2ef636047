//! Builder pattern for constructing a [`Dispatcher`] with flexible configuration.

use super::Dispatcher;
use crate::{
    cache::FastestEndpointCache,
    config::{AppConfig, StoreBackend},
    directory::{read_records, DirectoryError, EndpointDirectory},
    store::{FileStore, KeyValueStore, MemoryStore, StoreError},
    types::RequestIdSequence,
    upstream::{
        Canary, EndpointClient, FastestSelector, HttpClient, HttpClientConfig, Prober, DEFAULT_PROBE_TIMEOUT,
    },
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Default deadline for a live request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during dispatcher construction.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// HTTP client initialization failed
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(String),

    /// The chain directory could not be loaded
    #[error("Failed to load chain directory: {0}")]
    Directory(#[from] DirectoryError),

    /// The persistence backend could not be opened
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    /// A timeout was set to zero
    #[error("{0} must be greater than 0")]
    ZeroTimeout(&'static str),
}

/// Builder for constructing a [`Dispatcher`].
///
/// Defaults: built-in chain directory, in-memory store, Permit2 canary, 10 s probe and request
/// timeouts.
///
/// # Examples
///
/// ```no_run
/// # use scout_core::{dispatch::DispatcherBuilder, store::FileStore};
/// # use std::{sync::Arc, time::Duration};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = DispatcherBuilder::new()
///     .store(Arc::new(FileStore::open("data/scout-store.json")?))
///     .probe_timeout(Duration::from_secs(3))
///     .build()?;
///
/// let _response = dispatcher.dispatch(100, "eth_blockNumber", vec![]).await?;
/// # Ok(())
/// # }
/// ```
pub struct DispatcherBuilder {
    directory: Option<EndpointDirectory>,
    store: Option<Arc<dyn KeyValueStore>>,
    canary: Canary,
    probe_timeout: Duration,
    request_timeout: Duration,
    http_config: HttpClientConfig,
}

impl DispatcherBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            directory: None,
            store: None,
            canary: Canary::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            http_config: HttpClientConfig::default(),
        }
    }

    /// Creates a builder from loaded application configuration.
    ///
    /// Loads the chain registry file (merged onto the built-in registry unless
    /// `directory.include_builtin` is off) and opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Directory`] if the registry file cannot be loaded and
    /// [`BuilderError::Store`] if the file store cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self, BuilderError> {
        let file_records = match &config.directory.path {
            Some(path) => Some(read_records(path)?),
            None => None,
        };

        let directory = match (config.directory.include_builtin, file_records) {
            (true, Some(records)) => EndpointDirectory::builtin().merged_with(records),
            (true, None) => EndpointDirectory::builtin(),
            (false, Some(records)) => EndpointDirectory::from_records(records),
            (false, None) => EndpointDirectory::default(),
        };

        let store: Arc<dyn KeyValueStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File => Arc::new(FileStore::open(&config.store.path)?),
        };

        tracing::debug!(
            chains = directory.len(),
            store = ?config.store.backend,
            probe_timeout_ms = config.dispatch.probe_timeout_ms,
            request_timeout_ms = config.dispatch.request_timeout_ms,
            "building dispatcher from config"
        );

        Ok(Self::new()
            .directory(directory)
            .store(store)
            .probe_timeout(config.probe_timeout())
            .request_timeout(config.request_timeout())
            .http_config(config.http_client_config()))
    }

    /// Sets the chain directory (default: built-in registry).
    #[must_use]
    pub fn directory(mut self, directory: EndpointDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Sets the cache persistence backend (default: [`MemoryStore`]).
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the canary used for probing (default: [`Canary::permit2_code`]).
    #[must_use]
    pub fn canary(mut self, canary: Canary) -> Self {
        self.canary = canary;
        self
    }

    #[must_use]
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Builds the dispatcher, loading the persisted cache from the store.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ZeroTimeout`] for a zero timeout and
    /// [`BuilderError::HttpClientInit`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<Dispatcher, BuilderError> {
        if self.probe_timeout.is_zero() {
            return Err(BuilderError::ZeroTimeout("Probe timeout"));
        }
        if self.request_timeout.is_zero() {
            return Err(BuilderError::ZeroTimeout("Request timeout"));
        }

        let http_client = Arc::new(
            HttpClient::with_config(&self.http_config).map_err(|e| BuilderError::HttpClientInit(e.to_string()))?,
        );

        let client = EndpointClient::new(http_client, Arc::new(RequestIdSequence::new()));
        let prober = Prober::new(client.clone(), self.canary, self.probe_timeout);
        let selector = FastestSelector::new(prober);

        let directory = Arc::new(self.directory.unwrap_or_else(EndpointDirectory::builtin));
        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };
        let cache = FastestEndpointCache::load(store);

        Ok(Dispatcher::new(directory, cache, selector, client, self.request_timeout))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
