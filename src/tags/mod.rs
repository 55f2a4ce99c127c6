//! HTML tag rendering for bundles and assets.
//!
//! The page-side counterpart of the build: given a bundle name, emit the
//! `<script>` or `<link>` tags pointing at whatever the build produces for
//! the current settings.
//!
//! | Reference       | Emitted                                         |
//! |-----------------|-------------------------------------------------|
//! | `http...`, `//` | the reference unchanged                         |
//! | `*path/x.js`    | a single asset at its own directory             |
//! | bundle name     | `<relpath>/bundles/<name>.min.js` etc.          |
//!
//! With neither `minify` nor `combine` set, each bundle file is emitted
//! from `<relpath>/` individually.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::asset::{AssetKind, output::BUNDLES_DIR};
use crate::bundle::resolve_bundle;
use crate::config::{ModuleConfig, RebundleConfig};

/// Runs of slashes not preceded by `:` or another slash.
static DOUBLE_SLASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^:/])/{2,}").unwrap());

/// Options that depend on the requesting client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagOptions {
    /// Client sent `Accept-Encoding: gzip`.
    pub accepts_gzip: bool,
}

/// Render tags for `reference`. Empty when a bundle has no files of `kind`.
pub fn render_tags(
    config: &RebundleConfig,
    reference: &str,
    kind: AssetKind,
    options: TagOptions,
) -> Vec<String> {
    if is_remote(reference) {
        return vec![tag(kind, reference)];
    }

    let fallback = ModuleConfig {
        minify: false,
        ..ModuleConfig::default()
    };
    let module = config.module(kind).unwrap_or(&fallback);
    let renderer = Renderer {
        config,
        module,
        kind,
        options,
    };

    match reference.strip_prefix('*') {
        Some(asset) => renderer.asset(asset),
        None => renderer.bundle(reference),
    }
}

struct Renderer<'a> {
    config: &'a RebundleConfig,
    module: &'a ModuleConfig,
    kind: AssetKind,
    options: TagOptions,
}

impl Renderer<'_> {
    /// A single file outside the bundle table.
    fn asset(&self, path: &str) -> Vec<String> {
        let dir = match Path::new(path).parent().and_then(|p| p.to_str()) {
            Some(parent) if !parent.is_empty() => format!("{}/", parent.trim_end_matches('/')),
            _ => "./".to_owned(),
        };
        let ext = format!(".{}", self.kind.ext());
        let file = path.rsplit('/').next().unwrap_or(path);
        let stem = file.strip_suffix(&ext).unwrap_or(file);

        match self.compressed_name(path, stem) {
            Some(filename) => vec![self.compressed(&dir, &filename)],
            None => {
                let filepath = format!("{dir}{stem}{ext}");
                vec![tag(self.kind, &self.finish(&filepath, false))]
            }
        }
    }

    fn bundle(&self, name: &str) -> Vec<String> {
        let has_kind = self
            .config
            .bundles
            .get(name)
            .is_some_and(|bundle| bundle.entry(self.kind).is_some());
        if !has_kind {
            return Vec::new();
        }

        let files = resolve_bundle(&self.config.bundles, name, self.kind).files;
        if files.is_empty() {
            return Vec::new();
        }

        let relpath = self.module.relpath.trim_end_matches('/');
        match self.compressed_name(name, name) {
            Some(filename) => {
                let dir = format!("{relpath}/{BUNDLES_DIR}/");
                vec![self.compressed(&dir, &filename)]
            }
            None => files
                .iter()
                .map(|file| {
                    if is_remote(file) {
                        return tag(self.kind, file);
                    }
                    let filepath = format!("{relpath}/{}", file.trim_start_matches('/'));
                    tag(self.kind, &self.finish(&filepath, false))
                })
                .collect(),
        }
    }

    /// Artifact file name without extension, or `None` for uncompressed.
    fn compressed_name(&self, path: &str, stem: &str) -> Option<String> {
        let ext = self.kind.ext();
        let suffix = if self.module.minify {
            ".min"
        } else if self.module.combine {
            ".compressed"
        } else {
            return None;
        };

        if path.contains(&format!("{suffix}.{ext}")) {
            Some(stem.to_owned())
        } else {
            Some(format!("{stem}{suffix}"))
        }
    }

    fn compressed(&self, dir: &str, filename: &str) -> String {
        let ext = self.kind.ext();
        let cdn = &self.config.cdn;
        if !cdn.enable {
            let filepath = format!("{dir}{filename}.{ext}");
            return tag(self.kind, &self.finish(&filepath, false));
        }

        let mut filename = Cow::Borrowed(filename);
        if self.config.gzip.applies_to(self.kind)
            && self.options.accepts_gzip
            && !filename.ends_with(".gz")
        {
            filename = Cow::Owned(format!("{filename}.gz"));
        }

        let filepath = format!("{dir}{filename}.{ext}");
        let filepath = format!("{}{}", cdn.base_url(), self.finish(&filepath, true));
        tag(self.kind, &collapse_slashes(&filepath))
    }

    /// Apply find/replace and collapse duplicate slashes.
    ///
    /// With `strip_bucket`, the bucket name is removed from replacement
    /// values first so the CDN prefix does not repeat it.
    fn finish(&self, filepath: &str, strip_bucket: bool) -> String {
        let bucket = self.config.cdn.bucket.as_str();
        let replaced = if strip_bucket && !bucket.is_empty() {
            self.module.find_replace.apply_with(filepath, |value| {
                if value.contains(bucket) {
                    Cow::Owned(value.replace(bucket, "").replace("//", "/"))
                } else {
                    Cow::Borrowed(value)
                }
            })
        } else {
            self.module.find_replace.apply(filepath)
        };
        collapse_slashes(&replaced).into_owned()
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http") || reference.starts_with("//")
}

/// Collapse `//` runs to `/`, keeping a leading `//` and `scheme://`.
fn collapse_slashes(path: &str) -> Cow<'_, str> {
    DOUBLE_SLASH.replace_all(path, "${1}/")
}

fn tag(kind: AssetKind, url: &str) -> String {
    match kind {
        AssetKind::Js => format!(r#"<script type="text/javascript" src="{url}"></script>"#),
        AssetKind::Css => format!(r#"<link rel="stylesheet" type="text/css" href="{url}">"#),
    }
}
