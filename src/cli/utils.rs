// Shared utility functions for CLI commands

use anyhow::Result;
use blueberry::{AppConfig, CacheManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds a cache manager on the configured root and brings it to Active.
///
/// An install failure is degraded to a warning: the manager keeps serving
/// as a plain network passthrough, so catalog commands still work against
/// a reachable origin even when the static manifest cannot be seeded.
pub async fn ready_manager(config: &AppConfig) -> Result<Arc<CacheManager>> {
    let manager = Arc::new(CacheManager::new(config.cache_config())?);
    match manager.install().await {
        Ok(()) => manager.activate()?,
        Err(e) => log::warn!("Cache install failed ({e}), continuing without offline cache"),
    }
    Ok(manager)
}

/// Format number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Display path resolving "." to absolute path
pub fn display_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
