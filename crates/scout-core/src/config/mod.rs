//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: set on the `config` builder and mirrored in `Default` impls
//! 2. **Config file**: optional TOML file (`SCOUT_CONFIG`, default `config/scout.toml`)
//! 3. **Environment variables**: `SCOUT__SECTION__FIELD` overrides a single field
//!
//! # Configuration Sections
//!
//! - [`DirectoryConfig`]: where chain records come from
//! - [`StoreConfig`]: backend for the fastest-endpoint cache
//! - [`DispatchConfig`]: probe and request deadlines
//! - [`HttpConfig`]: connection pool settings
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [directory]
//! path = "config/chains.json"
//!
//! [store]
//! backend = "file"
//! path = "data/scout-store.json"
//!
//! [dispatch]
//! probe_timeout_ms = 3000
//! ```

use crate::upstream::HttpClientConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SCOUT_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/scout.toml";

/// Source of chain records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Chain registry JSON file. Records are merged onto the built-in set when
    /// `include_builtin` is on.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Start from the bundled registry. Defaults to `true`.
    #[serde(default = "default_true")]
    pub include_builtin: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self { path: None, include_builtin: true }
    }
}

/// Backing store for the fastest-endpoint cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// JSON file used by the `file` backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Memory, path: default_store_path() }
    }
}

/// Deadlines for outbound calls. Both must be greater than 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { probe_timeout_ms: default_timeout_ms(), request_timeout_ms: default_timeout_ms() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_pool_idle_timeout_seconds")]
    pub pool_idle_timeout_seconds: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            pool_idle_timeout_seconds: default_pool_idle_timeout_seconds(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset. Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"pretty"` or `"json"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/scout-store.json")
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_pool_idle_timeout_seconds() -> u64 {
    30
}

fn default_pool_max_idle_per_host() -> usize {
    16
}

fn default_user_agent() -> String {
    concat!("scout/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error. Use `__` as a separator for nested fields
    /// (e.g., `SCOUT__DISPATCH__PROBE_TIMEOUT_MS=3000`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or a value has the wrong type.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("directory.include_builtin", true)?
            .set_default("store.backend", "memory")?
            .set_default("store.path", "data/scout-store.json")?
            .set_default("dispatch.probe_timeout_ms", default_timeout_ms())?
            .set_default("dispatch.request_timeout_ms", default_timeout_ms())?
            .set_default("http.connect_timeout_ms", default_connect_timeout_ms())?
            .set_default("http.pool_idle_timeout_seconds", default_pool_idle_timeout_seconds())?
            .set_default("http.pool_max_idle_per_host", 16_u64)?
            .set_default("http.user_agent", default_user_agent())?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("SCOUT").prefix_separator("__").separator("__").try_parsing(true))
            .build()?;

        config_builder.try_deserialize()
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.probe_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.request_timeout_ms)
    }

    /// Converts the `http` section into transport settings.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            connect_timeout: Duration::from_millis(self.http.connect_timeout_ms),
            pool_idle_timeout: Duration::from_secs(self.http.pool_idle_timeout_seconds),
            pool_max_idle_per_host: self.http.pool_max_idle_per_host,
            user_agent: self.http.user_agent.clone(),
        }
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.dispatch.probe_timeout_ms == 0 {
            return Err("Probe timeout must be greater than 0".to_string());
        }

        if self.dispatch.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.http.connect_timeout_ms == 0 {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if self.store.backend == StoreBackend::File && self.store.path.as_os_str().is_empty() {
            return Err("File store requires a path".to_string());
        }

        if !self.directory.include_builtin && self.directory.path.is_none() {
            return Err("Directory needs a registry path when the built-in registry is disabled".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
