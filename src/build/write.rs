//! Artifact writing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::gzip;

/// Failure to write one artifact or its gzip companion.
#[derive(Debug, Error)]
#[error("failed to write `{path}`: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Files produced by one artifact write.
#[derive(Debug, Default)]
pub struct Written {
    pub artifact: Option<PathBuf>,
    pub companion: Option<PathBuf>,
}

/// Write `content` to `path`, plus its gzip companion when `gzip` is set.
///
/// Missing parent directories are created.
pub fn write_artifact(path: &Path, content: &str, gzip: bool) -> Result<Written, WriteError> {
    let err = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(err)?;
    }
    fs::write(path, content).map_err(err)?;

    let companion = if gzip {
        gzip::write_companion(path, content.as_bytes()).map_err(|source| WriteError {
            path: crate::asset::gzip_path(path).unwrap_or_else(|| path.to_path_buf()),
            source,
        })?
    } else {
        None
    };

    Ok(Written {
        artifact: Some(path.to_path_buf()),
        companion,
    })
}
