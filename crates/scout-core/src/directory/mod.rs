//! Static chain → endpoint directory.
//!
//! The directory is built once from chain-registry records (the `chainid.network` /
//! Chainlist JSON format) and never mutated afterwards. Construction filters every chain's
//! endpoint list down to URIs the HTTP transport can actually use:
//!
//! - the scheme must be `http` or `https` (`ws://` and `wss://` are dropped),
//! - the URI must not contain an unresolved `${...}` template placeholder,
//! - duplicates collapse to their first occurrence.
//!
//! A chain whose list is empty after filtering behaves as if it were absent, and lookups for
//! absent chains fall back to every endpoint in the directory.

use crate::types::ChainId;
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::HashSet, fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

/// Chain registry bundled with the library.
const BUILTIN_CHAINS_JSON: &str = include_str!("../../fixtures/chains.json");

/// Errors raised while building or querying the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Neither the requested chain nor any other chain has a usable endpoint.
    #[error("No RPC endpoints found for chain {chain_id} or any other chain")]
    NoEndpoints { chain_id: ChainId },

    /// The registry file could not be read.
    #[error("Failed to read chain registry: {0}")]
    Io(#[from] std::io::Error),

    /// The registry JSON did not match the expected shape.
    #[error("Invalid chain registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One chain as published by a chain registry.
///
/// Only the fields the directory needs are modelled; the rest of the registry entry
/// (explorers, faucets, currency, ...) is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub chain_id: ChainId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Raw endpoint list, before filtering. Entries may be plain strings or
    /// `{"url": "...", "tracking": "..."}` objects.
    #[serde(default, deserialize_with = "deserialize_rpc_entries")]
    pub rpc: Vec<String>,
}

impl ChainRecord {
    /// Creates a record with the given raw endpoint list.
    #[must_use]
    pub fn new(chain_id: ChainId, name: impl Into<String>, rpc: Vec<String>) -> Self {
        Self { chain_id, name: name.into(), chain: String::new(), short_name: None, rpc }
    }
}

fn deserialize_rpc_entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values.iter().filter_map(extract_rpc_url).collect())
}

fn extract_rpc_url(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(url) => Some(url.clone()),
        serde_json::Value::Object(obj) => {
            obj.get("url").and_then(serde_json::Value::as_str).map(ToString::to_string)
        }
        _ => None,
    }
}

/// Returns `true` if the URI can be used by the HTTP request/response transport.
///
/// # Example
///
/// ```
/// use scout_core::directory::is_usable_uri;
///
/// assert!(is_usable_uri("https://good.rpc"));
/// assert!(!is_usable_uri("wss://x"));
/// assert!(!is_usable_uri("https://rpc.io/${KEY}"));
/// ```
#[must_use]
pub fn is_usable_uri(uri: &str) -> bool {
    if uri.contains("${") || uri.contains('}') {
        return false;
    }

    match url::Url::parse(uri) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Usable endpoints of a single chain, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoints {
    pub chain_id: ChainId,
    pub name: String,
    pub uris: Vec<String>,
}

/// Read-only mapping from chain id to an ordered list of candidate endpoint URIs.
#[derive(Debug, Clone, Default)]
pub struct EndpointDirectory {
    chains: Vec<ChainEndpoints>,
}

impl EndpointDirectory {
    /// Builds a directory from registry records, filtering every endpoint list.
    ///
    /// When several records share a chain id, the first one wins.
    #[must_use]
    pub fn from_records(records: Vec<ChainRecord>) -> Self {
        let mut seen_chains = HashSet::new();
        let mut chains = Vec::with_capacity(records.len());

        for record in records {
            if !seen_chains.insert(record.chain_id) {
                debug!(chain_id = record.chain_id, "skipping duplicate chain record");
                continue;
            }

            let raw_count = record.rpc.len();
            let uris = dedup_usable(record.rpc.iter().map(String::as_str));
            if uris.len() < raw_count {
                debug!(
                    chain_id = record.chain_id,
                    kept = uris.len(),
                    dropped = raw_count - uris.len(),
                    "filtered unusable endpoints"
                );
            }

            chains.push(ChainEndpoints { chain_id: record.chain_id, name: record.name, uris });
        }

        Self { chains }
    }

    /// Parses a registry JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Parse`] if the JSON is not an array of chain records.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let records: Vec<ChainRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Loads a registry JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Io`] if the file cannot be read and
    /// [`DirectoryError::Parse`] if its contents are not a chain registry.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        Ok(Self::from_records(read_records(path)?))
    }

    /// Returns the registry bundled with the library.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_records(builtin_records())
    }

    /// Appends records for chains this directory does not know yet.
    ///
    /// Chains already present keep their existing endpoint list.
    #[must_use]
    pub fn merged_with(mut self, records: Vec<ChainRecord>) -> Self {
        let known: HashSet<ChainId> = self.chains.iter().map(|c| c.chain_id).collect();
        let additions: Vec<ChainRecord> =
            records.into_iter().filter(|r| !known.contains(&r.chain_id)).collect();

        debug!(added = additions.len(), "merging chain records into directory");
        self.chains.extend(Self::from_records(additions).chains);
        self
    }

    /// Returns the candidate endpoints for `chain_id`.
    ///
    /// Falls back to every endpoint of every chain when the chain is unknown or has no usable
    /// endpoint. Cross-chain candidates only make sense as a last resort: the canary probe still
    /// has to accept them.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoEndpoints`] if the directory has no usable endpoint at all.
    pub fn endpoints_for(&self, chain_id: ChainId) -> Result<Vec<String>, DirectoryError> {
        if let Some(chain) = self.chain(chain_id) {
            if !chain.uris.is_empty() {
                return Ok(chain.uris.clone());
            }
        }

        let all = dedup_usable(self.chains.iter().flat_map(|c| c.uris.iter().map(String::as_str)));
        if all.is_empty() {
            return Err(DirectoryError::NoEndpoints { chain_id });
        }

        warn!(
            chain_id = chain_id,
            candidates = all.len(),
            "no endpoints registered for chain, falling back to all known endpoints"
        );
        Ok(all)
    }

    /// Returns the directory entry for `chain_id`, if any.
    #[must_use]
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainEndpoints> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Iterates over all chains in registry order.
    pub fn chains(&self) -> impl Iterator<Item = &ChainEndpoints> {
        self.chains.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Reads raw chain records from a registry JSON file.
///
/// # Errors
///
/// Returns [`DirectoryError::Io`] if the file cannot be read and
/// [`DirectoryError::Parse`] if its contents are not a chain registry.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ChainRecord>, DirectoryError> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&contents)?)
}

/// Records of the bundled registry.
///
/// The bundled JSON is compiled in and covered by tests, so a parse failure can only come from
/// editing the fixture; it degrades to an empty list rather than panicking.
#[must_use]
pub fn builtin_records() -> Vec<ChainRecord> {
    serde_json::from_str(BUILTIN_CHAINS_JSON).unwrap_or_else(|e| {
        warn!(error = %e, "bundled chain registry is invalid");
        Vec::new()
    })
}

fn dedup_usable<'a>(uris: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    uris.filter(|uri| is_usable_uri(uri))
        .filter(|uri| seen.insert(*uri))
        .map(ToString::to_string)
        .collect()
}
