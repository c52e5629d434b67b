// src/cache/store.rs
//! Filesystem-backed cache storage.
//!
//! Each named partition is a directory under the store root; each cached
//! response is one entry file keyed by the SHA-256 of its request line.
//! Lookups never fail the request path: an unreadable or corrupt entry is
//! logged and treated as a miss.

use anyhow::{Context, Result};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::{self, EntryMeta};
use crate::constants::ENTRY_EXTENSION;

/// Partition-aware entry store rooted at a single directory.
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Opens (and creates, if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create cache root {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry file path for a URL within a partition. Keys are the SHA-256
    /// hex of `GET <url>` so arbitrary URLs map to safe filenames.
    pub fn entry_path(&self, partition: &str, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(format!("GET {url}"));
        let key = format!("{:x}", hasher.finalize());
        self.root
            .join(partition)
            .join(key)
            .with_extension(ENTRY_EXTENSION)
    }

    pub fn partition_exists(&self, partition: &str) -> bool {
        self.root.join(partition).is_dir()
    }

    /// Looks up a cached response. Corrupt or unreadable entries are
    /// misses, not errors.
    pub fn lookup(&self, partition: &str, url: &str) -> Option<(EntryMeta, Vec<u8>)> {
        let path = self.entry_path(partition, url);
        if !path.exists() {
            return None;
        }
        match entry::read_entry(&path) {
            Ok(hit) => Some(hit),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {e:#}", path.display());
                None
            }
        }
    }

    /// Stores a response body under `partition`, creating the partition
    /// directory on first use.
    pub fn put(
        &self,
        partition: &str,
        url: &str,
        status: u16,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<()> {
        let dir = self.root.join(partition);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create partition {}", dir.display()))?;

        let meta = EntryMeta {
            url: url.to_string(),
            status,
            content_type: content_type.map(str::to_string),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        let path = self.entry_path(partition, url);
        entry::write_entry(&path, &meta, body)?;
        debug!("Stored {} bytes for {} in {}", body.len(), url, partition);
        Ok(())
    }

    /// Names of all partition directories currently on disk, sorted.
    pub fn partitions(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for dent in fs::read_dir(&self.root)
            .with_context(|| format!("failed to read cache root {}", self.root.display()))?
        {
            let dent = dent?;
            if dent.file_type()?.is_dir() {
                names.push(dent.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes a partition and everything in it.
    pub fn remove_partition(&self, partition: &str) -> Result<()> {
        let dir = self.root.join(partition);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("failed to remove partition {}", dir.display()))?;
        }
        Ok(())
    }

    /// Renames a staging partition to its final name, replacing any
    /// previous generation of the same name.
    pub fn commit_partition(&self, staging: &str, final_name: &str) -> Result<()> {
        let from = self.root.join(staging);
        let to = self.root.join(final_name);
        if to.exists() {
            fs::remove_dir_all(&to)
                .with_context(|| format!("failed to clear {}", to.display()))?;
        }
        fs::rename(&from, &to)
            .with_context(|| format!("failed to commit partition {staging} -> {final_name}"))?;
        Ok(())
    }

    /// Number of entry files in a partition. Zero for missing partitions.
    pub fn entry_count(&self, partition: &str) -> usize {
        let dir = self.root.join(partition);
        let Ok(entries) = fs::read_dir(&dir) else {
            return 0;
        };
        entries
            .flatten()
            .filter(|d| {
                d.path().extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION)
            })
            .count()
    }

    /// Total bytes of all entry files in a partition.
    pub fn partition_size(&self, partition: &str) -> u64 {
        let dir = self.root.join(partition);
        let Ok(entries) = fs::read_dir(&dir) else {
            return 0;
        };
        entries
            .flatten()
            .filter_map(|d| d.metadata().ok())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store
            .put("static-v2", "http://x/app.js", 200, Some("text/javascript"), b"let a = 1;")
            .unwrap();

        let (meta, body) = store.lookup("static-v2", "http://x/app.js").unwrap();
        assert_eq!(meta.status, 200);
        assert_eq!(meta.url, "http://x/app.js");
        assert_eq!(body.as_slice(), b"let a = 1;");

        assert!(store.lookup("static-v2", "http://x/other.js").is_none());
        assert!(store.lookup("image-v2", "http://x/app.js").is_none());
    }

    #[test]
    fn test_entry_path_is_stable_and_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let a1 = store.entry_path("static-v2", "http://x/a");
        let a2 = store.entry_path("static-v2", "http://x/a");
        let b = store.entry_path("static-v2", "http://x/b");
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.extension().and_then(|e| e.to_str()), Some("entry"));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store
            .put("static-v2", "http://x/a", 200, None, b"payload")
            .unwrap();
        let path = store.entry_path("static-v2", "http://x/a");
        fs::write(&path, b"garbage").unwrap();

        assert!(store.lookup("static-v2", "http://x/a").is_none());
    }

    #[test]
    fn test_partitions_and_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.put("static-v2", "http://x/a", 200, None, b"1").unwrap();
        store.put("image-v2", "http://x/b", 200, None, b"2").unwrap();
        store.put("api-v2", "http://x/c", 200, None, b"3").unwrap();

        assert_eq!(store.partitions().unwrap(), vec!["api-v2", "image-v2", "static-v2"]);

        store.remove_partition("image-v2").unwrap();
        assert_eq!(store.partitions().unwrap(), vec!["api-v2", "static-v2"]);
        assert!(!store.partition_exists("image-v2"));

        // Removing an absent partition is fine
        store.remove_partition("image-v2").unwrap();
    }

    #[test]
    fn test_commit_partition_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.put("static-v2", "http://x/a", 200, None, b"old").unwrap();
        store
            .put("static-v2.installing", "http://x/a", 200, None, b"new")
            .unwrap();

        store
            .commit_partition("static-v2.installing", "static-v2")
            .unwrap();

        assert!(!store.partition_exists("static-v2.installing"));
        let (_, body) = store.lookup("static-v2", "http://x/a").unwrap();
        assert_eq!(body.as_slice(), b"new");
    }

    #[test]
    fn test_entry_count_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        assert_eq!(store.entry_count("static-v2"), 0);
        assert_eq!(store.partition_size("static-v2"), 0);

        store.put("static-v2", "http://x/a", 200, None, b"aaaa").unwrap();
        store.put("static-v2", "http://x/b", 200, None, b"bbbb").unwrap();

        assert_eq!(store.entry_count("static-v2"), 2);
        assert!(store.partition_size("static-v2") > 0);
    }
}
