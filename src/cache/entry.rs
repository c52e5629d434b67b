// src/cache/entry.rs
//! On-disk format for a single cached response.
//!
//! Layout:
//!
//! ```text
//! [0..4]   magic "BBCE"
//! [4..8]   meta length (u32 LE)
//! [8..n]   meta JSON (EntryMeta)
//! [n..]    zstd-compressed response body
//! ```
//!
//! Entries are written atomically: the full buffer goes to a `.tmp`
//! sibling first and is renamed into place, so a reader never observes a
//! half-written entry.

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::ENTRY_COMPRESSION_LEVEL;

/// Magic bytes identifying a cache entry file.
pub const ENTRY_MAGIC: &[u8; 4] = b"BBCE";

/// Metadata stored alongside the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Request URL the entry was stored under.
    pub url: String,
    /// HTTP status of the stored response.
    pub status: u16,
    /// Content-Type header, if the origin sent one.
    pub content_type: Option<String>,
    /// RFC 3339 timestamp of when the entry was written.
    pub stored_at: String,
}

/// Serializes meta + body into the entry container.
pub fn encode_entry(meta: &EntryMeta, body: &[u8]) -> Result<Vec<u8>> {
    let meta_json = sonic_rs::to_vec(meta).context("failed to serialize entry meta")?;
    let compressed =
        zstd::encode_all(body, ENTRY_COMPRESSION_LEVEL).context("failed to compress entry body")?;

    let mut buf = Vec::with_capacity(8 + meta_json.len() + compressed.len());
    buf.extend_from_slice(ENTRY_MAGIC);
    buf.extend_from_slice(&(meta_json.len() as u32).to_le_bytes());
    buf.extend_from_slice(&meta_json);
    buf.extend_from_slice(&compressed);
    Ok(buf)
}

/// Parses an entry buffer back into meta + body.
pub fn decode_entry(data: &[u8]) -> Result<(EntryMeta, Vec<u8>)> {
    ensure!(data.len() >= 8, "entry truncated: {} bytes", data.len());
    if &data[0..4] != ENTRY_MAGIC {
        bail!("invalid entry magic: {:?}", &data[0..4]);
    }

    let meta_len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    ensure!(
        data.len() >= 8 + meta_len,
        "entry meta truncated: need {} bytes, have {}",
        8 + meta_len,
        data.len()
    );

    let meta: EntryMeta =
        sonic_rs::from_slice(&data[8..8 + meta_len]).context("failed to parse entry meta")?;
    let body =
        zstd::decode_all(&data[8 + meta_len..]).context("failed to decompress entry body")?;
    Ok((meta, body))
}

/// Writes an entry to `path` atomically (tmp file + rename).
pub fn write_entry(path: &Path, meta: &EntryMeta, body: &[u8]) -> Result<()> {
    let buf = encode_entry(meta, body)?;
    let tmp = path.with_extension("entry.tmp");
    fs::write(&tmp, &buf).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move entry into place at {}", path.display()))?;
    Ok(())
}

/// Reads and decodes the entry at `path`.
pub fn read_entry(path: &Path) -> Result<(EntryMeta, Vec<u8>)> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_entry(&data)
}
