//! Output path derivation.
//!
//! ```text
//! app.js          → app.compressed.js / app.min.js
//! app.min.js      → app.compressed.js / app.min.js
//! app.min.js      → app.min.gz.js       (gzip companion)
//! ```

use std::path::{Path, PathBuf};

use super::AssetKind;

/// Directory under the output path holding bundle artifacts.
pub const BUNDLES_DIR: &str = "bundles";

/// Suffixes that mark a derived artifact.
const KNOWN_SUFFIXES: [&str; 3] = [".compressed", ".min", ".gz"];

/// Artifact written for a build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Concatenated sources, not minified.
    Combined,
    /// Concatenated, minified sources.
    Minified,
}

impl Artifact {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Combined => ".compressed",
            Self::Minified => ".min",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Minified => "minified",
        }
    }
}

/// Name without the kind's extension and without derived suffixes.
pub fn artifact_stem(name: &str, kind: AssetKind) -> &str {
    let mut stem = strip_suffix_ci(name, &format!(".{}", kind.ext())).unwrap_or(name);
    while let Some(shorter) = KNOWN_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ci(stem, suffix))
    {
        stem = shorter;
    }
    stem
}

/// File name for an artifact, e.g. `app.min.js`.
pub fn artifact_file_name(name: &str, kind: AssetKind, artifact: Artifact) -> String {
    format!("{}{}.{}", artifact_stem(name, kind), artifact.suffix(), kind.ext())
}

/// Path of the gzip companion of `path`: `.gz` goes before the extension.
///
/// Returns `None` for files that already are gzip companions or have no
/// extension.
pub fn gzip_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if name.contains(".gz.") {
        return None;
    }
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(format!("{stem}.gz.{ext}")))
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) || !s[split..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&s[..split])
}
