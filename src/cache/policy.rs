// src/cache/policy.rs
//! The three serving strategies.
//!
//! Each strategy is an async function over a shared [`PolicyCx`]. Store
//! writes are best-effort everywhere: a response that reached us is served
//! even when persisting it fails, and only 2xx responses are ever stored.

use log::{debug, warn};
use std::sync::{Arc, RwLock};

use super::entry::EntryMeta;
use super::store::CacheStore;
use super::{CacheStats, FetchRequest, FetchResponse, ResponseSource};
use crate::error::FetchError;

/// Shared context the strategies run against.
#[derive(Clone)]
pub struct PolicyCx {
    pub client: reqwest::Client,
    pub store: Arc<CacheStore>,
    pub stats: Arc<RwLock<CacheStats>>,
}

/// Issues the request against the network and drains the body.
///
/// The response is keyed by the *request* URL, so a redirected fetch still
/// overlays the URL the caller asked for.
pub async fn fetch_network(cx: &PolicyCx, req: &FetchRequest) -> Result<FetchResponse, FetchError> {
    let resp = cx
        .client
        .request(req.method.clone(), req.url.clone())
        .send()
        .await?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.bytes().await?.to_vec();
    Ok(FetchResponse {
        url: req.url.to_string(),
        status,
        content_type,
        body,
        source: ResponseSource::Network,
        stored_at: None,
    })
}

fn cached_response(meta: EntryMeta, body: Vec<u8>) -> FetchResponse {
    FetchResponse {
        url: meta.url,
        status: meta.status,
        content_type: meta.content_type,
        body,
        source: ResponseSource::Cache,
        stored_at: Some(meta.stored_at),
    }
}

fn store_best_effort(cx: &PolicyCx, partition: &str, resp: &FetchResponse) {
    let result = cx.store.put(
        partition,
        &resp.url,
        resp.status,
        resp.content_type.as_deref(),
        &resp.body,
    );
    if let Err(e) = result {
        warn!("Failed to store {} in {partition}: {e:#}", resp.url);
        cx.stats.write().unwrap().write_failures += 1;
    }
}

/// Cache wins; the network fills misses.
pub async fn cache_first(
    cx: &PolicyCx,
    partition: &str,
    req: &FetchRequest,
) -> Result<FetchResponse, FetchError> {
    let url = req.url.to_string();
    if let Some((meta, body)) = cx.store.lookup(partition, &url) {
        cx.stats.write().unwrap().hits += 1;
        return Ok(cached_response(meta, body));
    }
    cx.stats.write().unwrap().misses += 1;

    let resp = fetch_network(cx, req).await?;
    if resp.is_success() {
        store_best_effort(cx, partition, &resp);
    }
    Ok(resp)
}

/// Network wins; the cache covers transport failures.
///
/// A non-2xx origin answer is returned as-is and never stored. Only a
/// transport-level failure falls back to the stored entry.
pub async fn network_first(
    cx: &PolicyCx,
    partition: &str,
    req: &FetchRequest,
) -> Result<FetchResponse, FetchError> {
    match fetch_network(cx, req).await {
        Ok(resp) => {
            if resp.is_success() {
                store_best_effort(cx, partition, &resp);
            }
            Ok(resp)
        }
        Err(e) => {
            let url = req.url.to_string();
            if let Some((meta, body)) = cx.store.lookup(partition, &url) {
                debug!("Network failed for {url}, serving cached entry: {e}");
                cx.stats.write().unwrap().hits += 1;
                return Ok(cached_response(meta, body));
            }
            cx.stats.write().unwrap().misses += 1;
            Err(e)
        }
    }
}

/// Stale entry served immediately, refreshed in the background.
pub async fn stale_while_revalidate(
    cx: &PolicyCx,
    partition: &str,
    req: &FetchRequest,
) -> Result<FetchResponse, FetchError> {
    let url = req.url.to_string();
    if let Some((meta, body)) = cx.store.lookup(partition, &url) {
        cx.stats.write().unwrap().hits += 1;
        spawn_revalidate(cx, partition, req);
        return Ok(cached_response(meta, body));
    }
    cx.stats.write().unwrap().misses += 1;

    let resp = fetch_network(cx, req).await?;
    if resp.is_success() {
        store_best_effort(cx, partition, &resp);
    }
    Ok(resp)
}

/// Detached refresh of an entry that was just served stale. The caller
/// never observes the outcome; concurrent refreshes of the same entry are
/// last-write-wins through the store's atomic replace.
fn spawn_revalidate(cx: &PolicyCx, partition: &str, req: &FetchRequest) {
    let cx = cx.clone();
    let partition = partition.to_string();
    let req = req.clone();
    tokio::spawn(async move {
        match fetch_network(&cx, &req).await {
            Ok(resp) if resp.is_success() => {
                let result = cx.store.put(
                    &partition,
                    &resp.url,
                    resp.status,
                    resp.content_type.as_deref(),
                    &resp.body,
                );
                match result {
                    Ok(()) => {
                        cx.stats.write().unwrap().revalidations += 1;
                        debug!("Revalidated {} in {partition}", resp.url);
                    }
                    Err(e) => {
                        warn!("Failed to refresh {} in {partition}: {e:#}", resp.url);
                        cx.stats.write().unwrap().write_failures += 1;
                    }
                }
            }
            Ok(resp) => debug!("Revalidation of {} returned {}", req.url, resp.status),
            Err(e) => debug!("Revalidation of {} failed: {e}", req.url),
        }
    });
}
