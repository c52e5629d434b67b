// src/cache/manager.rs
//! Cache lifecycle and request dispatch.
//!
//! The manager walks an explicit state machine
//! (`Idle -> Installing -> Waiting -> Active`) instead of reacting to
//! lifecycle events. Install seeds the static partition from the
//! configured manifest all-or-nothing; activate garbage-collects foreign
//! partitions and starts intercepting; fetch classifies and dispatches.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use super::policy::{self, PolicyCx};
use super::routes::{self, PartitionKind, Strategy};
use super::store::CacheStore;
use super::{CacheConfig, CacheStats, FetchRequest, FetchResponse};
use crate::constants::{self, INSTALLING_SUFFIX};
use crate::error::{CacheError, FetchError};

/// Lifecycle states of the cache worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Fresh manager, nothing installed yet.
    Idle,
    /// Seeding the static partition.
    Installing,
    /// Installed, not yet serving.
    Waiting,
    /// Intercepting requests.
    Active,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Idle => "idle",
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Active => "active",
        }
    }
}

/// Offline-first cache front. See the module docs for the lifecycle.
pub struct CacheManager {
    config: CacheConfig,
    state: RwLock<WorkerState>,
    cx: PolicyCx,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Result<Self> {
        let store = CacheStore::open(&config.root)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(constants::user_agent())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            cx: PolicyCx {
                client,
                store: Arc::new(store),
                stats: Arc::new(RwLock::new(CacheStats::default())),
            },
            state: RwLock::new(WorkerState::Idle),
            config,
        })
    }

    /// Seeds the static partition from the configured manifest.
    ///
    /// A generation that is already on disk is not re-fetched; the manager
    /// moves straight to Waiting, which is what lets a restart come up
    /// with no network at all. Otherwise every manifest path must fetch
    /// with a 2xx or the whole install is rolled back and prior
    /// generations stay untouched.
    pub async fn install(&self) -> Result<(), CacheError> {
        self.transition(WorkerState::Idle, WorkerState::Installing, "idle")?;

        let static_partition = PartitionKind::Static.partition(self.config.version);
        if self.cx.store.partition_exists(&static_partition) {
            debug!("Partition {static_partition} already on disk, skipping install fetches");
            self.set_state(WorkerState::Waiting);
            return Ok(());
        }

        // A crashed install may have left a stale staging directory
        let staging = format!("{static_partition}{INSTALLING_SUFFIX}");
        self.cleanup_staging(&staging);
        info!(
            "Installing {} static assets into {staging}",
            self.config.manifest.len()
        );

        for path in &self.config.manifest {
            let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
            let req = match FetchRequest::get(&url) {
                Ok(req) => req,
                Err(e) => return self.abort_install(&staging, url, e.to_string()),
            };
            let resp = match policy::fetch_network(&self.cx, &req).await {
                Ok(resp) => resp,
                Err(e) => return self.abort_install(&staging, url, e.to_string()),
            };
            if !resp.is_success() {
                return self.abort_install(&staging, url, format!("status {}", resp.status));
            }
            let stored = self.cx.store.put(
                &staging,
                &resp.url,
                resp.status,
                resp.content_type.as_deref(),
                &resp.body,
            );
            if let Err(e) = stored {
                return self.abort_install(&staging, url, format!("{e:#}"));
            }
        }

        if let Err(e) = self.cx.store.commit_partition(&staging, &static_partition) {
            self.cleanup_staging(&staging);
            self.set_state(WorkerState::Idle);
            return Err(CacheError::Storage {
                reason: format!("{e:#}"),
            });
        }

        info!(
            "Install complete: {} entries in {static_partition}",
            self.cx.store.entry_count(&static_partition)
        );
        self.set_state(WorkerState::Waiting);
        Ok(())
    }

    /// Takes over serving and sweeps partitions from other generations,
    /// including staging directories left by a crashed install. Sweep
    /// failures are logged, never fatal.
    pub fn activate(&self) -> Result<(), CacheError> {
        self.transition(WorkerState::Waiting, WorkerState::Active, "waiting")?;

        let keep: Vec<String> = [PartitionKind::Static, PartitionKind::Image, PartitionKind::Api]
            .iter()
            .map(|k| k.partition(self.config.version))
            .collect();

        match self.cx.store.partitions() {
            Ok(partitions) => {
                for name in partitions {
                    if keep.contains(&name) {
                        continue;
                    }
                    info!("Removing stale cache partition {name}");
                    if let Err(e) = self.cx.store.remove_partition(&name) {
                        warn!("Failed to remove stale partition {name}: {e:#}");
                    }
                }
            }
            Err(e) => warn!("Could not enumerate partitions for cleanup: {e:#}"),
        }
        Ok(())
    }

    /// Serves a request through the configured routing.
    ///
    /// Non-GET requests and any request arriving before activation hit
    /// the network directly and are never stored.
    pub async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let active = *self.state.read().unwrap() == WorkerState::Active;
        if !active || req.method != reqwest::Method::GET {
            self.cx.stats.write().unwrap().passthrough += 1;
            return policy::fetch_network(&self.cx, req).await;
        }

        let (strategy, kind) = routes::classify(req, &self.config.document_store_host);
        let partition = kind.partition(self.config.version);
        debug!("{} {} -> {strategy:?} ({partition})", req.method, req.url);

        match strategy {
            Strategy::CacheFirst => policy::cache_first(&self.cx, &partition, req).await,
            Strategy::NetworkFirst => policy::network_first(&self.cx, &partition, req).await,
            Strategy::StaleWhileRevalidate => {
                policy::stale_while_revalidate(&self.cx, &partition, req).await
            }
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap()
    }

    pub fn stats(&self) -> CacheStats {
        self.cx.stats.read().unwrap().clone()
    }

    pub fn store(&self) -> &CacheStore {
        &self.cx.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn transition(
        &self,
        from: WorkerState,
        to: WorkerState,
        expected: &'static str,
    ) -> Result<(), CacheError> {
        let mut state = self.state.write().unwrap();
        if *state != from {
            return Err(CacheError::InvalidState {
                state: *state,
                expected,
            });
        }
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: WorkerState) {
        *self.state.write().unwrap() = to;
    }

    fn abort_install(
        &self,
        staging: &str,
        url: String,
        reason: String,
    ) -> Result<(), CacheError> {
        self.cleanup_staging(staging);
        self.set_state(WorkerState::Idle);
        Err(CacheError::InstallFailed { url, reason })
    }

    fn cleanup_staging(&self, staging: &str) {
        if let Err(e) = self.cx.store.remove_partition(staging) {
            warn!("Failed to clean staging partition {staging}: {e:#}");
        }
    }
}
