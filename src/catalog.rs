// src/catalog.rs
//! The aggregated video catalog: shard-ordered records plus an id index.

use crate::record::VideoRecord;
use std::collections::{HashMap, HashSet};

/// Immutable once built; shared as `Arc<Catalog>` by all readers.
#[derive(Debug, Default)]
pub struct Catalog {
    videos: Vec<VideoRecord>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build from records already in shard-major order. Ids are unique by
    /// construction (`{shard}_{position}`), so the index is total.
    pub fn from_records(videos: Vec<VideoRecord>) -> Self {
        let by_id = videos
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.clone(), i))
            .collect();
        Self { videos, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&VideoRecord> {
        self.by_id.get(id).map(|&i| &self.videos[i])
    }

    /// Records for the given ids, in catalog order, silently dropping ids
    /// that do not resolve. Duplicate ids yield one record.
    pub fn get_many(&self, ids: &[impl AsRef<str>]) -> Vec<&VideoRecord> {
        let wanted: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.videos
            .iter()
            .filter(|v| wanted.contains(v.id.as_str()))
            .collect()
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.videos.iter()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}
