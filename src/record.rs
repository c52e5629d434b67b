// src/record.rs
//! Video record type and packed-string parsing.
//!
//! A shard element carries one `embed` string with positional fields:
//! `embedUrl|thumbnailUrl|(unused)|title|tags(;)|categories(;)|performer|duration|views|likes|dislikes`

use crate::constants::{FIELD_DELIMITER, LIST_DELIMITER};
use serde::{Deserialize, Serialize};

/// One catalog entry. Scalar fields are empty strings when the packed
/// record omits them; absence is never represented as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Globally unique, `{shard}_{position}`; stable across reloads for a
    /// fixed shard set
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub embed_url: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub performer: String,
    pub duration: String,
    pub views: String,
    pub likes: String,
    pub dislikes: String,
}

impl VideoRecord {
    /// Parse one packed record. `position` is the element's index within
    /// the shard array, counting dropped siblings, so ids stay stable when
    /// a neighbouring element fails to parse.
    pub fn from_packed(shard: u32, position: usize, packed: &str) -> Self {
        let slots: Vec<&str> = packed.split(FIELD_DELIMITER).collect();
        let slot = |i: usize| slots.get(i).copied().unwrap_or("").to_string();
        let list = |i: usize| match slots.get(i) {
            Some(s) if !s.is_empty() => {
                s.split(LIST_DELIMITER).map(str::to_string).collect()
            }
            _ => Vec::new(),
        };

        Self {
            id: format!("{}_{}", shard, position),
            embed_url: slot(0),
            thumbnail_url: slot(1),
            // slot 2 is unused in the packed format
            title: slot(3),
            tags: list(4),
            categories: list(5),
            performer: slot(6),
            duration: slot(7),
            views: slot(8),
            likes: slot(9),
            dislikes: slot(10),
        }
    }
}
