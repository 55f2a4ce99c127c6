//! Gzip companions for written artifacts.
//!
//! `app.min.js` gets `app.min.gz.js` next to it, compressed at the
//! highest level.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::asset::gzip_path;

/// Compress `data` with maximum compression.
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 3), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Write the gzip companion of `path` holding `data`.
///
/// Returns `Ok(None)` when `path` is itself a gzip companion.
pub fn write_companion(path: &Path, data: &[u8]) -> io::Result<Option<PathBuf>> {
    let Some(target) = gzip_path(path) else {
        return Ok(None);
    };
    fs::write(&target, compress(data)?)?;
    Ok(Some(target))
}
