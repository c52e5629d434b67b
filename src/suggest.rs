// src/suggest.rs
//! Search suggestions over catalog metadata.
//!
//! Tags, categories and performers are collected into sorted sets at
//! build time; queries are case-insensitive substring matches with
//! per-kind caps (4 tags, 3 categories, 3 performers) and a global cap
//! of 10, matching the search box this feeds.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::constants::{
    MAX_CATEGORY_SUGGESTIONS, MAX_PERFORMER_SUGGESTIONS, MAX_TAG_SUGGESTIONS,
    MAX_TOTAL_SUGGESTIONS, MIN_QUERY_LEN,
};

/// Which facet a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Tag,
    Category,
    Performer,
}

/// One typed completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub value: String,
}

/// Deduplicated metadata values, ready to answer search-box queries.
#[derive(Debug, Default)]
pub struct SuggestionIndex {
    tags: BTreeSet<String>,
    categories: BTreeSet<String>,
    performers: BTreeSet<String>,
}

impl SuggestionIndex {
    /// Collects every distinct tag, category and performer from an
    /// already-loaded catalog. Values are trimmed; empties are discarded.
    pub fn build_from(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for video in catalog.iter() {
            for tag in &video.tags {
                insert_trimmed(&mut index.tags, tag);
            }
            for category in &video.categories {
                insert_trimmed(&mut index.categories, category);
            }
            insert_trimmed(&mut index.performers, &video.performer);
        }
        index
    }

    /// Suggestions for `input`, at most `min(max_results, 10)` of them.
    ///
    /// Inputs shorter than two characters return nothing. Within each
    /// kind, results come back in lexicographic order; kinds are emitted
    /// tags first, then categories, then performers.
    pub fn query(&self, input: &str, max_results: usize) -> Vec<Suggestion> {
        let needle = input.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let mut out = Vec::new();
        push_matches(&mut out, &self.tags, SuggestionKind::Tag, &needle, MAX_TAG_SUGGESTIONS);
        push_matches(
            &mut out,
            &self.categories,
            SuggestionKind::Category,
            &needle,
            MAX_CATEGORY_SUGGESTIONS,
        );
        push_matches(
            &mut out,
            &self.performers,
            SuggestionKind::Performer,
            &needle,
            MAX_PERFORMER_SUGGESTIONS,
        );
        out.truncate(max_results.min(MAX_TOTAL_SUGGESTIONS));
        out
    }

    /// (tags, categories, performers) set sizes.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.tags.len(), self.categories.len(), self.performers.len())
    }
}

fn insert_trimmed(set: &mut BTreeSet<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        set.insert(trimmed.to_string());
    }
}

fn push_matches(
    out: &mut Vec<Suggestion>,
    source: &BTreeSet<String>,
    kind: SuggestionKind,
    needle: &str,
    cap: usize,
) {
    let mut taken = 0;
    for value in source {
        if taken == cap {
            break;
        }
        if value.to_lowercase().contains(needle) {
            out.push(Suggestion {
                kind,
                value: value.clone(),
            });
            taken += 1;
        }
    }
}
