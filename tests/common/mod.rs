#![allow(dead_code)]

use anyhow::Result;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use blueberry::{CacheConfig, CacheManager, LoaderOptions};

pub fn setup_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(anyhow::Error::from)
}

#[derive(Default)]
struct OriginState {
    /// path -> (content type, body)
    bodies: Mutex<HashMap<String, (String, Vec<u8>)>>,
    /// paths answering 500 instead of their body
    failing: Mutex<HashSet<String>>,
    /// paths that sleep before answering
    delays: Mutex<HashMap<String, Duration>>,
    hits: Mutex<HashMap<String, usize>>,
}

/// In-process HTTP origin with switchable bodies and per-path hit
/// counters, served on an ephemeral port.
pub struct TestOrigin {
    pub base_url: String,
    state: Arc<OriginState>,
    handle: tokio::task::JoinHandle<()>,
}

async fn serve(State(state): State<Arc<OriginState>>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let delay = state.delays.lock().unwrap().get(&path).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if state.failing.lock().unwrap().contains(&path) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.bodies.lock().unwrap().get(&path) {
        Some((content_type, body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.clone())],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl TestOrigin {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(OriginState::default());
        let app = Router::new().fallback(serve).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn set_body(&self, path: &str, content_type: &str, body: &[u8]) {
        self.state.bodies.lock().unwrap().insert(
            path.to_string(),
            (content_type.to_string(), body.to_vec()),
        );
    }

    /// Serves a shard file in the wire format: a JSON array of objects
    /// whose `embed` field holds the packed record.
    pub fn set_shard(&self, shard: u32, records: &[&str]) {
        let elements: Vec<serde_json::Value> = records
            .iter()
            .map(|packed| serde_json::json!({ "embed": packed }))
            .collect();
        let json = serde_json::to_string(&elements).unwrap();
        self.set_body(
            &format!("/data/data_{shard}.json"),
            "application/json",
            json.as_bytes(),
        );
    }

    /// Serves a shard file with a verbatim body (for malformed payloads).
    pub fn set_raw_shard(&self, shard: u32, body: &str) {
        self.set_body(
            &format!("/data/data_{shard}.json"),
            "application/json",
            body.as_bytes(),
        );
    }

    pub fn fail_path(&self, path: &str) {
        self.state.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn fail_shard(&self, shard: u32) {
        self.fail_path(&format!("/data/data_{shard}.json"));
    }

    /// Makes a path sleep before answering, to trip client timeouts.
    pub fn delay_shard(&self, shard: u32, delay: Duration) {
        self.state
            .delays
            .lock()
            .unwrap()
            .insert(format!("/data/data_{shard}.json"), delay);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn shard_hits(&self, shard: u32) -> usize {
        self.hits(&format!("/data/data_{shard}.json"))
    }

    /// Stops the origin and waits for the port to close, so later
    /// requests fail at the transport level.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// Base URL on a port nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub const TEST_MANIFEST: &[&str] = &["/index.html", "/css/styles.css"];

/// Seeds the origin with every path in [`TEST_MANIFEST`].
pub fn seed_manifest(origin: &TestOrigin) {
    origin.set_body("/index.html", "text/html", b"<html>blueberry</html>");
    origin.set_body("/css/styles.css", "text/css", b"body { margin: 0 }");
}

pub fn test_cache_config(root: &Path, base_url: &str) -> CacheConfig {
    CacheConfig {
        root: root.to_path_buf(),
        version: 2,
        base_url: base_url.to_string(),
        manifest: TEST_MANIFEST.iter().map(|s| s.to_string()).collect(),
        document_store_host: "firestore.googleapis.com".to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub fn test_loader_options(base_url: &str, shard_count: u32) -> LoaderOptions {
    LoaderOptions {
        base_url: base_url.to_string(),
        shard_count,
        failure_threshold: 0.5,
    }
}

/// Manager on `root`, installed from the origin and activated.
pub async fn active_manager(root: &Path, origin: &TestOrigin) -> Result<Arc<CacheManager>> {
    let manager = Arc::new(CacheManager::new(test_cache_config(root, &origin.base_url))?);
    manager.install().await?;
    manager.activate()?;
    Ok(manager)
}
