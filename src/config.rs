// src/config.rs
//! Runtime configuration.
//!
//! Defaults come from `constants`, `BLUEBERRY_*` environment variables
//! override them, and CLI flags override both (the merge with flags
//! happens in the CLI layer). Unparsable env values are logged and fall
//! back to the default rather than aborting.

use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_DIR, DEFAULT_CACHE_VERSION, DEFAULT_DOCUMENT_STORE_HOST,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_SHARD_COUNT, DEFAULT_TIMEOUT_SECS, ENV_BASE_URL,
    ENV_CACHE_DIR, ENV_CACHE_VERSION, ENV_DOCUMENT_STORE_HOST, ENV_FAILURE_THRESHOLD,
    ENV_SHARD_COUNT, ENV_TIMEOUT_SECS, STATIC_MANIFEST,
};
use crate::loader::LoaderOptions;

/// Application-level settings shared by the loader, cache and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub cache_version: u32,
    pub shard_count: u32,
    pub failure_threshold: f64,
    pub timeout_secs: u64,
    pub document_store_host: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_version: DEFAULT_CACHE_VERSION,
            shard_count: DEFAULT_SHARD_COUNT,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            document_store_host: DEFAULT_DOCUMENT_STORE_HOST.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with any `BLUEBERRY_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string(ENV_BASE_URL, &defaults.base_url),
            cache_dir: PathBuf::from(env_string(
                ENV_CACHE_DIR,
                &defaults.cache_dir.to_string_lossy(),
            )),
            cache_version: env_parse(ENV_CACHE_VERSION, defaults.cache_version),
            shard_count: env_parse(ENV_SHARD_COUNT, defaults.shard_count),
            failure_threshold: env_parse(ENV_FAILURE_THRESHOLD, defaults.failure_threshold),
            timeout_secs: env_parse(ENV_TIMEOUT_SECS, defaults.timeout_secs),
            document_store_host: env_string(ENV_DOCUMENT_STORE_HOST, &defaults.document_store_host),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            root: self.cache_dir.clone(),
            version: self.cache_version,
            base_url: self.base_url.clone(),
            manifest: STATIC_MANIFEST.iter().map(|s| s.to_string()).collect(),
            document_store_host: self.document_store_host.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            base_url: self.base_url.clone(),
            shard_count: self.shard_count,
            failure_threshold: self.failure_threshold,
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => default.to_string(),
    }
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {name}={raw:?}, using default");
                default
            }
        },
        Err(_) => default,
    }
}
