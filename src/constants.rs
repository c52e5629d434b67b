//! Global constants and helpers for shard layout, cache partitions, networking defaults, and suggestion limits

/// Binary name used in user agents and metadata
pub const BINARY_NAME: &str = "blueberry";

/// Package version from Cargo.toml (set at compile time)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the user agent string for HTTP requests
pub fn user_agent() -> String {
    format!("{}/{}", BINARY_NAME, VERSION)
}

// ============================================================================
// Catalog Shard Constants
// ============================================================================

/// Number of catalog shard files (`data_0.json` .. `data_46.json`)
pub const DEFAULT_SHARD_COUNT: u32 = 47;

/// URL path prefix under which shard files are served
pub const DATA_PATH_PREFIX: &str = "/data/";

/// Delimiter between positional fields inside a packed record
pub const FIELD_DELIMITER: char = '|';

/// Delimiter between items inside the tag/category list fields
pub const LIST_DELIMITER: char = ';';

/// Fraction of shards that may fail before the whole load aborts.
/// Strictly-greater-than comparison: with 47 shards and 0.5, the 24th
/// failure aborts.
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.5;

/// Returns the shard URL for a given base URL and shard index
pub fn shard_url(base_url: &str, shard: u32) -> String {
    format!(
        "{}{}data_{}.json",
        base_url.trim_end_matches('/'),
        DATA_PATH_PREFIX,
        shard
    )
}

// ============================================================================
// Cache Partition Constants
// ============================================================================

/// Current cache generation; bumped on every deployed revision
pub const DEFAULT_CACHE_VERSION: u32 = 2;

/// Suffix for staging partitions while install seeding is in flight
pub const INSTALLING_SUFFIX: &str = ".installing";

/// File extension for stored cache entries
pub const ENTRY_EXTENSION: &str = "entry";

/// Zstd compression level for cache entry bodies (1 = fast)
pub const ENTRY_COMPRESSION_LEVEL: i32 = 1;

/// Default on-disk cache root
pub const DEFAULT_CACHE_DIR: &str = ".blueberry-cache";

/// Asset paths seeded into the static partition during install
pub const STATIC_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/src/styles/main.css",
    "/src/components/video-thumbnail.js",
    "/src/components/category-grid.js",
    "/src/components/navigation-drawer.js",
    "/src/components/video-player.js",
    "/src/components/search-bar.js",
    "/src/components/pagination.js",
    "/src/components/toast.js",
    "/src/components/modal.js",
    "/src/components/form-elements.js",
    "/src/components/loading-spinner.js",
    "/src/components/error-boundary.js",
    "/src/pages/home.js",
    "/src/pages/video.js",
    "/src/pages/categories.js",
    "/src/pages/search.js",
    "/src/pages/profile.js",
    "/src/pages/settings.js",
    "/src/pages/login.js",
    "/src/pages/about.js",
    "/src/services/auth-service.js",
    "/src/services/data-service.js",
    "/src/services/local-history-service.js",
    "/src/services/recommendation-service.js",
    "/src/utils/data-loader.js",
    "/src/utils/keyboard-shortcuts.js",
    "/src/config/firebase.js",
];

// ============================================================================
// Network Constants
// ============================================================================

/// Default origin serving shards and static assets
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default HTTP request timeout (applies to every fetch, shards included)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Remote document-store host whose traffic is routed network-first
pub const DEFAULT_DOCUMENT_STORE_HOST: &str = "firestore.googleapis.com";

// ============================================================================
// Suggestion Constants
// ============================================================================

/// Minimum query length (in characters) before suggestions are produced
pub const MIN_QUERY_LEN: usize = 2;

/// Per-kind suggestion caps, applied before the global cap
pub const MAX_TAG_SUGGESTIONS: usize = 4;
pub const MAX_CATEGORY_SUGGESTIONS: usize = 3;
pub const MAX_PERFORMER_SUGGESTIONS: usize = 3;

/// Global cap across all suggestion kinds
pub const MAX_TOTAL_SUGGESTIONS: usize = 10;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_BASE_URL: &str = "BLUEBERRY_BASE_URL";
pub const ENV_CACHE_DIR: &str = "BLUEBERRY_CACHE_DIR";
pub const ENV_CACHE_VERSION: &str = "BLUEBERRY_CACHE_VERSION";
pub const ENV_SHARD_COUNT: &str = "BLUEBERRY_SHARD_COUNT";
pub const ENV_FAILURE_THRESHOLD: &str = "BLUEBERRY_FAILURE_THRESHOLD";
pub const ENV_TIMEOUT_SECS: &str = "BLUEBERRY_TIMEOUT_SECS";
pub const ENV_DOCUMENT_STORE_HOST: &str = "BLUEBERRY_DOCUMENT_STORE_HOST";
