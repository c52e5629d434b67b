// src/cache/routes.rs
//! Request classification: which caching strategy and which partition a
//! request belongs to.
//!
//! Rules are checked in order; the first match wins:
//!
//! 1. image destination or image file extension -> cache-first, image partition
//! 2. shard data path or document-store host    -> network-first, api partition
//! 3. script/style destination or .js/.css      -> stale-while-revalidate, static partition
//! 4. everything else                           -> cache-first, static partition

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Destination, FetchRequest};
use crate::constants::DATA_PATH_PREFIX;

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(png|jpg|jpeg|gif|webp|svg)$").unwrap());
static ASSET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(js|css)$").unwrap());

/// How a request is served relative to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from cache; on a miss, fetch from the network and store
    /// the response.
    CacheFirst,
    /// Try the network first and store successes; fall back to cache on
    /// transport failure.
    NetworkFirst,
    /// Serve stale from cache immediately and refresh in the background.
    StaleWhileRevalidate,
}

/// Logical cache partition for a class of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Static,
    Image,
    Api,
}

impl PartitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::Static => "static",
            PartitionKind::Image => "image",
            PartitionKind::Api => "api",
        }
    }

    /// Versioned partition directory name, e.g. `static-v2`.
    pub fn partition(&self, version: u32) -> String {
        format!("{}-v{}", self.as_str(), version)
    }
}

/// Classifies a request into a strategy and target partition.
pub fn classify(req: &FetchRequest, document_store_host: &str) -> (Strategy, PartitionKind) {
    let path = req.url.path();

    if req.destination == Some(Destination::Image) || IMAGE_RE.is_match(path) {
        return (Strategy::CacheFirst, PartitionKind::Image);
    }

    let is_data_shard = path.starts_with(DATA_PATH_PREFIX);
    let is_document_store = req.url.host_str() == Some(document_store_host);
    if is_data_shard || is_document_store {
        return (Strategy::NetworkFirst, PartitionKind::Api);
    }

    let is_asset_dest = matches!(
        req.destination,
        Some(Destination::Script) | Some(Destination::Style)
    );
    if is_asset_dest || ASSET_RE.is_match(path) {
        return (Strategy::StaleWhileRevalidate, PartitionKind::Static);
    }

    (Strategy::CacheFirst, PartitionKind::Static)
}
