//! Bundle dependency flattening.
//!
//! A bundle's `requires` are merged ahead of its own files. For each
//! required name in declared order: skip it if already visited, skip it if
//! it has no files of the requested kind, otherwise append its files and
//! then walk its own `requires` before moving to the next sibling.
//!
//! ```text
//! A requires [B, C]      B requires [C]
//! A = [a1]  B = [b1]  C = [c1]
//!
//! resolve(A) = [b1, c1, a1]
//! ```
//!
//! Files are deduplicated with the first occurrence winning. Cycles end at
//! the second visit of a name without an error.

use rustc_hash::FxHashSet;

use crate::asset::AssetKind;
use crate::config::{BundleConfig, BundleTable};

/// Maximum nesting of `requires` followed before giving up on deeper levels.
pub const MAX_DEPTH: usize = 64;

/// Flattened file list of one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Files in build order, each once.
    pub files: Vec<String>,
    /// Required names not present in the bundle table, in encounter order.
    pub missing: Vec<String>,
    /// Whether requirements nested deeper than [`MAX_DEPTH`] were ignored.
    pub truncated: bool,
}

/// Flatten `name` for `kind`.
///
/// An unknown `name` yields an empty resolution listing it as missing.
pub fn resolve_bundle(table: &BundleTable, name: &str, kind: AssetKind) -> Resolution {
    let Some(bundle) = table.get(name) else {
        return Resolution {
            missing: vec![name.to_owned()],
            ..Resolution::default()
        };
    };

    let mut walk = Walk {
        table,
        kind,
        visited: FxHashSet::default(),
        seen: FxHashSet::default(),
        files: Vec::new(),
        missing: Vec::new(),
        truncated: false,
    };
    walk.requires(bundle, 0);
    walk.merge(bundle.files(kind));

    Resolution {
        files: walk.files.into_iter().map(str::to_owned).collect(),
        missing: walk.missing.into_iter().map(str::to_owned).collect(),
        truncated: walk.truncated,
    }
}

struct Walk<'a> {
    table: &'a BundleTable,
    kind: AssetKind,
    /// Required bundle names already handled.
    visited: FxHashSet<&'a str>,
    /// Files already in `files`.
    seen: FxHashSet<&'a str>,
    files: Vec<&'a str>,
    missing: Vec<&'a str>,
    truncated: bool,
}

impl<'a> Walk<'a> {
    fn requires(&mut self, bundle: &'a BundleConfig, depth: usize) {
        let requires = bundle.requires(self.kind);
        if requires.is_empty() {
            return;
        }
        if depth >= MAX_DEPTH {
            self.truncated = true;
            return;
        }

        for name in requires {
            if !self.visited.insert(name.as_str()) {
                continue;
            }
            let Some(required) = self.table.get(name) else {
                self.missing.push(name);
                continue;
            };
            let files = required.files(self.kind);
            if files.is_empty() {
                continue;
            }
            self.merge(files);
            self.requires(required, depth + 1);
        }
    }

    /// Append files not yet present, keeping their order.
    fn merge(&mut self, files: &'a [String]) {
        for file in files {
            if self.seen.insert(file.as_str()) {
                self.files.push(file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BundleEntry;

    fn table(defs: &[(&str, &[&str], &[&str])]) -> BundleTable {
        defs.iter()
            .map(|(name, files, requires)| {
                let entry = BundleEntry {
                    files: files.iter().map(|s| s.to_string()).collect(),
                    requires: requires.iter().map(|s| s.to_string()).collect(),
                };
                let bundle = BundleConfig {
                    css: None,
                    js: Some(entry),
                };
                (name.to_string(), bundle)
            })
            .collect()
    }

    fn files(table: &BundleTable, name: &str) -> Vec<String> {
        resolve_bundle(table, name, AssetKind::Js).files
    }

    #[test]
    fn test_no_requires() {
        let t = table(&[("a", &["a1", "a2"], &[])]);
        assert_eq!(files(&t, "a"), ["a1", "a2"]);
    }

    #[test]
    fn test_shared_requirement_included_once() {
        let t = table(&[
            ("A", &["a1"], &["B", "C"]),
            ("B", &["b1"], &["C"]),
            ("C", &["c1"], &[]),
        ]);
        let r = resolve_bundle(&t, "A", AssetKind::Js);
        assert_eq!(r.files, ["b1", "c1", "a1"]);
        assert!(r.missing.is_empty());
        assert!(!r.truncated);
    }

    #[test]
    fn test_requirement_files_before_its_requirements() {
        let t = table(&[
            ("app", &["app.js"], &["ui"]),
            ("ui", &["ui.js"], &["core"]),
            ("core", &["core.js"], &[]),
        ]);
        assert_eq!(files(&t, "app"), ["ui.js", "core.js", "app.js"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let t = table(&[("X", &["x1"], &["Y"]), ("Y", &["y1"], &["X"])]);
        assert_eq!(files(&t, "X"), ["y1", "x1"]);
        assert_eq!(files(&t, "Y"), ["x1", "y1"]);
    }

    #[test]
    fn test_self_requirement() {
        let t = table(&[("S", &["s1"], &["S"])]);
        assert_eq!(files(&t, "S"), ["s1"]);
    }

    #[test]
    fn test_duplicate_files_first_wins() {
        let t = table(&[
            ("page", &["shared.js", "page.js"], &["lib"]),
            ("lib", &["shared.js", "lib.js"], &[]),
        ]);
        assert_eq!(files(&t, "page"), ["shared.js", "lib.js", "page.js"]);
    }

    #[test]
    fn test_missing_requirement_skipped_and_reported() {
        let t = table(&[("a", &["a1"], &["ghost", "b"]), ("b", &["b1"], &[])]);
        let r = resolve_bundle(&t, "a", AssetKind::Js);
        assert_eq!(r.files, ["b1", "a1"]);
        assert_eq!(r.missing, ["ghost"]);
    }

    #[test]
    fn test_requirement_without_files_skipped_with_its_requires() {
        let t = table(&[
            ("a", &["a1"], &["empty"]),
            ("empty", &[], &["c"]),
            ("c", &["c1"], &[]),
        ]);
        assert_eq!(files(&t, "a"), ["a1"]);
    }

    #[test]
    fn test_other_kind_ignored() {
        let mut t = table(&[("a", &["a.js"], &["b"])]);
        t.insert(
            "b".into(),
            BundleConfig {
                css: Some(BundleEntry {
                    files: vec!["b.css".into()],
                    requires: vec![],
                }),
                js: None,
            },
        );
        assert_eq!(files(&t, "a"), ["a.js"]);
        assert!(resolve_bundle(&t, "a", AssetKind::Css).files.is_empty());
        assert_eq!(resolve_bundle(&t, "b", AssetKind::Css).files, ["b.css"]);
    }

    #[test]
    fn test_unknown_bundle() {
        let t = table(&[("a", &["a1"], &[])]);
        let r = resolve_bundle(&t, "nope", AssetKind::Js);
        assert!(r.files.is_empty());
        assert_eq!(r.missing, ["nope"]);
    }

    #[test]
    fn test_depth_cap() {
        let names: Vec<String> = (0..=MAX_DEPTH + 2).map(|i| format!("b{i}")).collect();
        let mut t = BundleTable::default();
        for (i, name) in names.iter().enumerate() {
            let requires = names.get(i + 1).cloned().into_iter().collect();
            t.insert(
                name.clone(),
                BundleConfig {
                    css: None,
                    js: Some(BundleEntry {
                        files: vec![format!("{name}.js")],
                        requires,
                    }),
                },
            );
        }

        let r = resolve_bundle(&t, "b0", AssetKind::Js);
        assert!(r.truncated);
        // b1..=b64 merged, b0's own file last
        assert_eq!(r.files.len(), MAX_DEPTH + 1);
        assert_eq!(r.files.last().map(String::as_str), Some("b0.js"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let t = table(&[
            ("A", &["a1"], &["B", "C"]),
            ("B", &["b1"], &["C"]),
            ("C", &["c1"], &[]),
        ]);
        let first = resolve_bundle(&t, "A", AssetKind::Js);
        for _ in 0..10 {
            assert_eq!(resolve_bundle(&t, "A", AssetKind::Js), first);
        }
    }
}
