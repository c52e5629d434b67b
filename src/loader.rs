// src/loader.rs
//! Sharded catalog loading.
//!
//! The full catalog is split across `shard_count` JSON files on the
//! origin (`/data/data_{i}.json`). The loader fetches them sequentially
//! through the cache manager, tolerates individual shard failures up to a
//! configurable fraction, and memoizes the assembled catalog so repeat
//! calls are free until [`CatalogLoader::reset`].

use anyhow::{Context, Result, bail, ensure};
use log::{debug, info, warn};
use serde::Serialize;
use sonic_rs::{JsonContainerTrait, JsonValueTrait};
use std::sync::{Arc, RwLock};

use crate::cache::{CacheManager, FetchRequest};
use crate::catalog::Catalog;
use crate::constants::{self, DEFAULT_FAILURE_THRESHOLD, DEFAULT_SHARD_COUNT};
use crate::error::LoadError;
use crate::record::VideoRecord;

/// Tuning for a [`CatalogLoader`].
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Origin the shards are fetched from.
    pub base_url: String,
    /// Number of shard files, indices `0..shard_count`.
    pub shard_count: u32,
    /// Load aborts once `failed > shard_count * failure_threshold`.
    pub failure_threshold: f64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            shard_count: DEFAULT_SHARD_COUNT,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Outcome of the most recent successful load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub total_shards: u32,
    pub shards_loaded: u32,
    pub shards_failed: u32,
    /// Elements discarded for lacking a usable `embed` string.
    pub records_dropped: u32,
    pub videos: usize,
}

struct LoadedCatalog {
    catalog: Arc<Catalog>,
    report: LoadReport,
}

/// Records parsed out of one shard.
#[derive(Debug)]
struct ShardBatch {
    records: Vec<VideoRecord>,
    dropped: u32,
}

/// Loads and memoizes the sharded video catalog.
pub struct CatalogLoader {
    cache: Arc<CacheManager>,
    opts: LoaderOptions,
    loaded: RwLock<Option<LoadedCatalog>>,
    /// Serializes concurrent first loads so shards are fetched once.
    load_gate: tokio::sync::Mutex<()>,
}

impl CatalogLoader {
    pub fn new(cache: Arc<CacheManager>, opts: LoaderOptions) -> Self {
        Self {
            cache,
            opts,
            loaded: RwLock::new(None),
            load_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the full catalog, fetching all shards on first use.
    ///
    /// Failures are not memoized; a later call after a failed load starts
    /// over.
    pub async fn load_all(&self) -> Result<Arc<Catalog>, LoadError> {
        self.load_all_with_progress(None::<fn(u32, u32)>).await
    }

    /// Like [`load_all`](Self::load_all), invoking `progress` with
    /// `(completed, total)` after each shard attempt.
    pub async fn load_all_with_progress<F>(
        &self,
        progress: Option<F>,
    ) -> Result<Arc<Catalog>, LoadError>
    where
        F: Fn(u32, u32) + Send + Sync,
    {
        if let Some(catalog) = self.cached() {
            return Ok(catalog);
        }

        let _gate = self.load_gate.lock().await;
        // A concurrent caller may have finished while we waited
        if let Some(catalog) = self.cached() {
            return Ok(catalog);
        }

        let (catalog, report) = self.fetch_all(progress).await?;
        let catalog = Arc::new(catalog);
        *self.loaded.write().unwrap() = Some(LoadedCatalog {
            catalog: Arc::clone(&catalog),
            report,
        });
        Ok(catalog)
    }

    /// Single record by id, loading the catalog if needed.
    pub async fn video_by_id(&self, id: &str) -> Result<Option<VideoRecord>, LoadError> {
        let catalog = self.load_all().await?;
        Ok(catalog.get(id).cloned())
    }

    /// Records for the given ids in catalog order. Unknown ids are
    /// silently skipped.
    pub async fn videos_by_ids(
        &self,
        ids: &[impl AsRef<str>],
    ) -> Result<Vec<VideoRecord>, LoadError> {
        let catalog = self.load_all().await?;
        Ok(catalog.get_many(ids).into_iter().cloned().collect())
    }

    /// Report of the most recent successful load, if any.
    pub fn last_report(&self) -> Option<LoadReport> {
        self.loaded.read().unwrap().as_ref().map(|l| l.report.clone())
    }

    /// Drops the memoized catalog; the next load fetches everything
    /// again.
    pub fn reset(&self) {
        debug!("Resetting memoized catalog");
        *self.loaded.write().unwrap() = None;
    }

    fn cached(&self) -> Option<Arc<Catalog>> {
        self.loaded
            .read()
            .unwrap()
            .as_ref()
            .map(|l| Arc::clone(&l.catalog))
    }

    async fn fetch_all<F>(&self, progress: Option<F>) -> Result<(Catalog, LoadReport), LoadError>
    where
        F: Fn(u32, u32) + Send + Sync,
    {
        let total = self.opts.shard_count;
        let mut records = Vec::new();
        let mut failed = 0u32;
        let mut dropped = 0u32;

        for shard in 0..total {
            match self.load_shard(shard).await {
                Ok(batch) => {
                    dropped += batch.dropped;
                    records.extend(batch.records);
                }
                Err(e) => {
                    failed += 1;
                    warn!("Shard {shard} failed: {e:#}");
                    if failed as f64 > total as f64 * self.opts.failure_threshold {
                        warn!("Aborting load, {failed}/{total} shards failed");
                        return Err(LoadError::MajorityShardsFailed { failed, total });
                    }
                }
            }
            if let Some(ref progress) = progress {
                progress(shard + 1, total);
            }
        }

        if records.is_empty() {
            return Err(LoadError::NoRecords {
                shards_ok: total - failed,
            });
        }

        let report = LoadReport {
            total_shards: total,
            shards_loaded: total - failed,
            shards_failed: failed,
            records_dropped: dropped,
            videos: records.len(),
        };
        info!(
            "Loaded {} videos from {} shards ({} failed)",
            report.videos, report.shards_loaded, report.shards_failed
        );
        Ok((Catalog::from_records(records), report))
    }

    async fn load_shard(&self, shard: u32) -> Result<ShardBatch> {
        let url = constants::shard_url(&self.opts.base_url, shard);
        let req = FetchRequest::get(&url)?;
        let resp = self.cache.fetch(&req).await?;
        ensure!(resp.is_success(), "shard fetch returned status {}", resp.status);
        parse_shard_body(shard, &resp.body)
    }
}

/// Parses a shard body: a JSON array of objects, each carrying one
/// packed record in its `embed` field.
///
/// Elements without a string `embed` are dropped individually; their
/// siblings keep their positions, so record ids stay stable across
/// drops. An `embed` that is present but empty still yields a (blank)
/// record.
fn parse_shard_body(shard: u32, body: &[u8]) -> Result<ShardBatch> {
    let value: sonic_rs::Value =
        sonic_rs::from_slice(body).context("shard body is not valid JSON")?;
    let Some(items) = value.as_array() else {
        bail!("shard body is not a JSON array");
    };

    let mut records = Vec::with_capacity(items.len());
    let mut dropped = 0u32;
    for (position, item) in items.iter().enumerate() {
        let Some(packed) = item.get("embed").and_then(|field| field.as_str()) else {
            dropped += 1;
            warn!("Shard {shard}: dropping element {shard}_{position} without an embed string");
            continue;
        };
        records.push(VideoRecord::from_packed(shard, position, packed));
    }
    Ok(ShardBatch { records, dropped })
}
