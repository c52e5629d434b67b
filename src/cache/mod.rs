// src/cache/mod.rs
//! Offline-first response cache.
//!
//! The manager owns a partitioned on-disk store and intercepts GET
//! requests the way a service worker would: requests are classified into
//! a strategy (cache-first, network-first, stale-while-revalidate) and a
//! partition, and the cache lifecycle (install / activate / fetch) is an
//! explicit state machine instead of event-handler side effects.

pub mod entry;
pub mod manager;
pub mod policy;
pub mod routes;
pub mod store;

pub use manager::{CacheManager, WorkerState};
pub use routes::{PartitionKind, Strategy, classify};
pub use store::CacheStore;

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_DIR, DEFAULT_CACHE_VERSION, DEFAULT_DOCUMENT_STORE_HOST,
    DEFAULT_TIMEOUT_SECS, STATIC_MANIFEST,
};
use crate::error::FetchError;

/// What kind of content a request is for, when the caller knows.
///
/// Mirrors the `destination` hint a browser attaches to subresource
/// requests; routing falls back to URL extensions when it is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Image,
    Script,
    Style,
    Document,
}

/// A request entering the cache layer.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: reqwest::Url,
    pub method: reqwest::Method,
    pub destination: Option<Destination>,
}

impl FetchRequest {
    /// Builds a GET request for `url`.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url: parsed,
            method: reqwest::Method::GET,
            destination: None,
        })
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_method(mut self, method: reqwest::Method) -> Self {
        self.method = method;
        self
    }
}

/// Where a response was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
}

/// A response leaving the cache layer.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Request URL this response answers.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
    /// When the entry was written, for cache-served responses.
    pub stored_at: Option<String>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Counters the manager keeps while serving.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the store.
    pub hits: u64,
    /// Lookups that went to the network for lack of an entry.
    pub misses: u64,
    /// Background refreshes that replaced a stale entry.
    pub revalidations: u64,
    /// Store writes that failed (the response was still served).
    pub write_failures: u64,
    /// Requests served without interception (non-GET or not active).
    pub passthrough: u64,
}

/// Configuration for a [`CacheManager`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the partition directories.
    pub root: PathBuf,
    /// Cache generation; bumping it makes `activate` sweep the old one.
    pub version: u32,
    /// Origin the static manifest is installed from.
    pub base_url: String,
    /// Paths seeded into the static partition during install.
    pub manifest: Vec<String>,
    /// Host whose traffic is routed network-first into the api partition.
    pub document_store_host: String,
    /// Per-request network timeout.
    pub timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CACHE_DIR),
            version: DEFAULT_CACHE_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            manifest: STATIC_MANIFEST.iter().map(|s| s.to_string()).collect(),
            document_store_host: DEFAULT_DOCUMENT_STORE_HOST.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
