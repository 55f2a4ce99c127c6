//! `[bundles.<name>]` table.
//!
//! # Example
//!
//! ```toml
//! [bundles.core]
//! js = { files = ["core.js"] }
//! css = { files = ["core.css"] }
//!
//! [bundles.app]
//! js = { files = ["app.js"], requires = ["core"] }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::asset::AssetKind;

/// All bundles in declaration order.
pub type BundleTable = IndexMap<String, BundleConfig>;

/// One named bundle, with separate file lists per asset kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub css: Option<BundleEntry>,
    pub js: Option<BundleEntry>,
}

/// Files and prerequisites of a bundle for one asset kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BundleEntry {
    /// References relative to the module basepath, or remote URLs.
    pub files: Vec<String>,
    /// Names of bundles whose files come first.
    pub requires: Vec<String>,
}

impl BundleConfig {
    pub fn entry(&self, kind: AssetKind) -> Option<&BundleEntry> {
        match kind {
            AssetKind::Css => self.css.as_ref(),
            AssetKind::Js => self.js.as_ref(),
        }
    }

    /// Own files for `kind`, empty when the bundle has none.
    pub fn files(&self, kind: AssetKind) -> &[String] {
        self.entry(kind).map_or(&[], |e| e.files.as_slice())
    }

    pub fn requires(&self, kind: AssetKind) -> &[String] {
        self.entry(kind).map_or(&[], |e| e.requires.as_slice())
    }
}
