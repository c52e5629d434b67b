// src/lib.rs
//! Offline-first cache and sharded catalog runtime for the Blueberry
//! video browser.
//!
//! Three pieces work together:
//!
//! - [`cache::CacheManager`] intercepts GET requests the way a service
//!   worker would: an explicit install/activate lifecycle, versioned
//!   on-disk partitions, and per-route strategies (cache-first,
//!   network-first, stale-while-revalidate).
//! - [`loader::CatalogLoader`] assembles the full video catalog from the
//!   origin's numbered shard files, fetched through the cache so offline
//!   fallback applies, with a configurable tolerance for failed shards
//!   and a memoized result.
//! - [`suggest::SuggestionIndex`] answers typed search-box completions
//!   over the loaded catalog's tags, categories and performers.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod record;
pub mod suggest;

pub use cache::{
    CacheConfig, CacheManager, CacheStats, CacheStore, Destination, FetchRequest, FetchResponse,
    PartitionKind, ResponseSource, Strategy, WorkerState,
};
pub use catalog::Catalog;
pub use config::AppConfig;
pub use error::{CacheError, FetchError, LoadError};
pub use loader::{CatalogLoader, LoadReport, LoaderOptions};
pub use record::VideoRecord;
pub use suggest::{Suggestion, SuggestionIndex, SuggestionKind};
