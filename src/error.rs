// src/error.rs
//! Classified error types for the load and cache surfaces.
//!
//! Per-shard and per-record failures are absorbed where they happen and
//! only surface in aggregate; the types here are the conditions callers
//! must be able to tell apart.

use crate::cache::WorkerState;
use thiserror::Error;

/// Terminal failures of a full catalog load. Both are fatal to the caller
/// but must stay distinguishable: one points at connectivity, the other at
/// the data itself.
#[derive(Debug, Error)]
pub enum LoadError {
    /// More than the tolerated fraction of shards failed to fetch or parse.
    #[error("Unable to load video data. Please check your internet connection and try again.")]
    MajorityShardsFailed { failed: u32, total: u32 },

    /// Every shard was accounted for, yet not a single record came out.
    #[error("No video data could be loaded. Please try refreshing the page.")]
    NoRecords { shards_ok: u32 },
}

/// Failures of a single fetch issued through the cache layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failures of the cache lifecycle. A failed install leaves previously
/// committed generations untouched.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache install failed for {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("invalid worker state {state:?}, expected {expected}")]
    InvalidState {
        state: WorkerState,
        expected: &'static str,
    },

    #[error("cache storage failed: {reason}")]
    Storage { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_are_distinguishable() {
        let majority = LoadError::MajorityShardsFailed {
            failed: 24,
            total: 47,
        };
        let empty = LoadError::NoRecords { shards_ok: 47 };

        assert!(matches!(
            majority,
            LoadError::MajorityShardsFailed { failed: 24, .. }
        ));
        assert!(matches!(empty, LoadError::NoRecords { shards_ok: 47 }));

        // The user-facing messages name different remedies
        assert!(majority.to_string().contains("internet connection"));
        assert!(empty.to_string().contains("refreshing"));
    }
}
