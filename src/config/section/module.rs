//! `[js]` and `[css]` module sections.
//!
//! # Example
//!
//! ```toml
//! [js]
//! basepath = "public/js"
//! relpath = "/js"
//! output_file = "app.js"
//! files = ["a.js", "vendor/b.min.js", "//cdn.example.com/c.js"]
//! combine = true
//! minify = true
//!
//! [js.find_replace]
//! "__ENV__" = "production"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset::{AssetKind, FindReplace};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Build settings for one asset kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Directory holding the sources; file references resolve against it.
    pub basepath: PathBuf,
    /// Public URL prefix of `basepath`, used when rendering tags.
    pub relpath: String,
    /// Where artifacts go. Defaults to `basepath`.
    pub output_path: Option<PathBuf>,
    /// Name of the standalone target built from `files`.
    pub output_file: Option<String>,
    /// Sources of the standalone target.
    pub files: Vec<String>,
    /// Write `<name>.compressed.<ext>`.
    pub combine: bool,
    /// Write `<name>.min.<ext>`.
    pub minify: bool,
    /// Rebuild regardless of timestamps.
    pub force_rebuild: bool,
    /// Literal substitutions over every source and emitted path.
    pub find_replace: FindReplace,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            basepath: PathBuf::new(),
            relpath: "/".into(),
            output_path: None,
            output_file: None,
            files: Vec::new(),
            combine: false,
            minify: true,
            force_rebuild: false,
            find_replace: FindReplace::default(),
        }
    }
}

impl ModuleConfig {
    /// Directory artifacts are written to.
    pub fn output_dir(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.basepath)
    }

    /// Whether any artifact is enabled.
    pub const fn writes_anything(&self) -> bool {
        self.combine || self.minify
    }

    /// Resolve relative paths against `root`.
    pub(crate) fn normalize(&mut self, root: &Path) {
        if !self.basepath.as_os_str().is_empty() {
            self.basepath = crate::utils::path::normalize_path(&root.join(&self.basepath));
        }
        if let Some(output) = self.output_path.take() {
            self.output_path = Some(crate::utils::path::normalize_path(&root.join(output)));
        }
    }

    /// Check directories and names. Call after [`normalize`](Self::normalize).
    pub fn validate(&self, kind: AssetKind, diag: &mut ConfigDiagnostics) {
        let section = FieldPath::owned(kind.ext());

        if self.basepath.as_os_str().is_empty() {
            diag.error(section.join("basepath"), "basepath is required");
        } else if !self.basepath.is_dir() {
            diag.error_with_hint(
                section.join("basepath"),
                format!("directory `{}` does not exist", self.basepath.display()),
                "create the directory or fix the path",
            );
        }

        if let Some(output) = &self.output_path {
            check_output_dir(output, section.join("output_path"), diag);
        }

        if let Some(file) = &self.output_file {
            let field = section.join("output_file");
            if file.starts_with("http") || file.starts_with("//") {
                diag.error(field, format!("`{file}` must be a local file name"));
            } else if !file.to_ascii_lowercase().ends_with(&format!(".{}", kind.ext())) {
                diag.error_with_hint(
                    field,
                    format!("`{file}` does not end in .{}", kind.ext()),
                    format!("use a name like `app.{}`", kind.ext()),
                );
            } else if self.files.is_empty() {
                diag.warn(field, "output_file is set but files is empty");
            }
        }

        if !self.writes_anything() {
            diag.warn(section, "neither combine nor minify is enabled, nothing will be written");
        }
    }
}

/// Output directory must exist and be writable.
fn check_output_dir(dir: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            diag.error(field, format!("`{}` is not a directory", dir.display()));
        }
        Ok(meta) if meta.permissions().readonly() => {
            diag.error(field, format!("`{}` is not writable", dir.display()));
        }
        Ok(_) => {}
        Err(_) => diag.error_with_hint(
            field,
            format!("directory `{}` does not exist", dir.display()),
            "create the directory or fix the path",
        ),
    }
}
