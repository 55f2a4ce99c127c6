//! Build orchestration.
//!
//! Each target runs through its own state machine (see [`TargetState`]):
//!
//! 1. **Staleness** - compare source and output mtimes, or honor
//!    `force_rebuild`. Fresh targets stop at `Clean`.
//! 2. **Fetch** - read every source once, apply find/replace. Sources that
//!    can't be read are logged and left out.
//! 3. **Combining** - concatenate into `<name>.compressed.<ext>`.
//! 4. **Minifying** - minify each source unless it is marked `.min.`,
//!    concatenate into `<name>.min.<ext>`. A source the lexer rejects is
//!    logged and left out.
//!
//! Targets are independent and run in parallel. Planning guarantees no two
//! targets share an output path.

mod state;
mod write;

pub use state::TargetState;
pub use write::{WriteError, write_artifact};

use std::path::PathBuf;

use rayon::prelude::*;

use crate::asset::{Artifact, SourceReader, SourceRef};
use crate::bundle::BuildTarget;
use crate::config::RebundleConfig;
use crate::freshness::{output_mtimes, requires_rebuild};
use crate::logger::ProgressLine;
use crate::minify::{is_preminified, minify_by_kind};
use crate::{debug, log};

/// Outcome of one target.
#[derive(Debug)]
pub struct TargetReport {
    pub label: String,
    pub state: TargetState,
    /// Files written, gzip companions included.
    pub written: Vec<PathBuf>,
    /// Sources left out because they could not be read or minified.
    pub skipped_sources: usize,
    pub errors: Vec<WriteError>,
}

impl TargetReport {
    fn new(label: String) -> Self {
        Self {
            label,
            state: TargetState::Clean,
            written: Vec::new(),
            skipped_sources: 0,
            errors: Vec::new(),
        }
    }

    fn advance(&mut self, next: TargetState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "{}: {} -> {next}",
            self.label,
            self.state
        );
        debug!("build"; "{}: {next}", self.label);
        self.state = next;
    }
}

/// Totals over a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub written: usize,
    pub clean: usize,
    pub failed: usize,
}

impl BuildSummary {
    pub fn from_reports(reports: &[TargetReport]) -> Self {
        reports.iter().fold(Self::default(), |mut s, r| {
            match r.state {
                TargetState::Written => s.written += 1,
                TargetState::Clean => s.clean += 1,
                _ => s.failed += 1,
            }
            s
        })
    }
}

/// Build all targets in parallel.
pub fn build_targets<R: SourceReader>(
    targets: &[BuildTarget<'_>],
    reader: &R,
    config: &RebundleConfig,
    progress: Option<&ProgressLine>,
) -> Vec<TargetReport> {
    targets
        .par_iter()
        .map(|target| {
            let report = build_target(target, reader, config);
            debug_assert!(report.state.is_terminal(), "{}: {}", report.label, report.state);
            if let Some(p) = progress {
                p.inc(target.kind.ext());
            }
            report
        })
        .collect()
}

/// Run one target to a terminal state.
pub fn build_target<R: SourceReader>(
    target: &BuildTarget<'_>,
    reader: &R,
    config: &RebundleConfig,
) -> TargetReport {
    let mut report = TargetReport::new(target.label());

    if target.outputs.is_empty() {
        log!("warning"; "{}: neither combine nor minify is enabled", report.label);
        return report;
    }

    let sources: Vec<_> = target.sources.iter().map(|s| reader.modified(s)).collect();
    let outputs = output_mtimes(&target.output_paths());
    if !requires_rebuild(target.module.force_rebuild, &sources, &outputs) {
        debug!("build"; "{}: up to date", report.label);
        return report;
    }
    report.advance(TargetState::Stale);

    let contents = fetch_sources(target, reader, &mut report);
    let gzip = config.gzip.applies_to(target.kind);

    if let Some(path) = target.output(Artifact::Combined) {
        report.advance(TargetState::Combining);
        let combined: String = contents.iter().map(|(_, c)| c.as_str()).collect();
        write_output(&mut report, Artifact::Combined, path, &combined, gzip, config);
    }

    if let Some(path) = target.output(Artifact::Minified) {
        report.advance(TargetState::Minifying);
        let minified = minify_sources(target, &contents, &mut report);
        write_output(&mut report, Artifact::Minified, path, &minified, gzip, config);
    }

    let done = if report.errors.is_empty() {
        TargetState::Written
    } else {
        TargetState::Failed
    };
    report.advance(done);
    report
}

/// Read every source once and apply find/replace.
fn fetch_sources<'t, R: SourceReader>(
    target: &'t BuildTarget<'_>,
    reader: &R,
    report: &mut TargetReport,
) -> Vec<(&'t SourceRef, String)> {
    target
        .sources
        .iter()
        .filter_map(|source| match reader.read(source) {
            Ok(content) if target.module.find_replace.is_empty() => Some((source, content)),
            Ok(content) => {
                let replaced = target.module.find_replace.apply(&content).into_owned();
                Some((source, replaced))
            }
            Err(e) => {
                log!("error"; "{}: {e}", report.label);
                report.skipped_sources += 1;
                None
            }
        })
        .collect()
}

/// Minify and concatenate fetched sources.
fn minify_sources(
    target: &BuildTarget<'_>,
    contents: &[(&SourceRef, String)],
    report: &mut TargetReport,
) -> String {
    let mut out = String::new();
    for (source, content) in contents {
        if is_preminified(source.file_name()) {
            debug!(target.kind.ext(); "{source}: already minified");
            out.push_str(content);
            continue;
        }
        match minify_by_kind(target.kind, content) {
            Ok(minified) => out.push_str(&minified),
            Err(e) => {
                log!("error"; "{}: cannot minify {source}: {e}", report.label);
                report.skipped_sources += 1;
            }
        }
    }
    out
}

fn write_output(
    report: &mut TargetReport,
    artifact: Artifact,
    path: &std::path::Path,
    content: &str,
    gzip: bool,
    config: &RebundleConfig,
) {
    if content.is_empty() {
        log!(
            "warning";
            "{}: {} output is empty, not writing {}",
            report.label,
            artifact.label(),
            config.root_relative(path).display()
        );
        return;
    }

    match write_artifact(path, content, gzip) {
        Ok(written) => {
            for file in written.artifact.into_iter().chain(written.companion) {
                log!("bundle"; "{}", config.root_relative(&file).display());
                report.written.push(file);
            }
        }
        Err(e) => {
            log!("error"; "{}: {e}", report.label);
            report.errors.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::FetchError;
    use crate::bundle::plan_targets;
    use crate::config::test_parse_config;
    use crate::minify::minify_js;
    use rustc_hash::FxHashMap;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// In-memory sources keyed by file name.
    #[derive(Default)]
    struct MemReader {
        files: FxHashMap<String, (String, Option<SystemTime>)>,
    }

    impl MemReader {
        fn with(mut self, name: &str, content: &str) -> Self {
            let time = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1));
            self.files.insert(name.into(), (content.into(), time));
            self
        }
    }

    impl SourceReader for MemReader {
        fn read(&self, source: &SourceRef) -> Result<String, FetchError> {
            self.files
                .get(source.file_name())
                .map(|(c, _)| c.clone())
                .filter(|c| !c.is_empty())
                .ok_or_else(|| FetchError::Empty {
                    file: source.clone(),
                })
        }

        fn modified(&self, source: &SourceRef) -> Option<SystemTime> {
            self.files.get(source.file_name()).and_then(|(_, t)| *t)
        }
    }

    fn project(config: &str) -> (TempDir, RebundleConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        let config = test_parse_config(config, dir.path());
        (dir, config)
    }

    fn js_dir(config: &RebundleConfig) -> &Path {
        &config.js.as_ref().unwrap().basepath
    }

    fn build_one(config: &RebundleConfig, reader: &MemReader) -> TargetReport {
        let plan = plan_targets(config, &[]);
        assert_eq!(plan.targets.len(), 1);
        build_target(&plan.targets[0], reader, config)
    }

    #[test]
    fn test_minified_skips_preminified_files() {
        let (dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["a.js", "b.min.js"]
            minify = true
            combine = false
            "#,
        );
        let a = "// lib a\nvar a = 1;\n";
        let b = "var b = 2 ;  // kept as is\n";
        fs::write(dir.path().join("js/a.js"), a).unwrap();
        fs::write(dir.path().join("js/b.min.js"), b).unwrap();

        let plan = plan_targets(&config, &[]);
        let reports = build_targets(&plan.targets, &crate::asset::FsReader::new(), &config, None);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].state, TargetState::Written);

        let js = js_dir(&config);
        let out = fs::read_to_string(js.join("app.min.js")).unwrap();
        assert_eq!(out, format!("{}{b}", minify_js(a).unwrap()));
        assert!(!js.join("app.compressed.js").exists());
    }

    #[test]
    fn test_combined_applies_find_replace() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["a.js", "b.min.js"]
            combine = true
            minify = false

            [js.find_replace]
            "__ENV__" = "prod"
            "#,
        );
        let reader = MemReader::default()
            .with("a.js", "env = '__ENV__';\n")
            .with("b.min.js", "x='__ENV__';");

        let report = build_one(&config, &reader);
        assert_eq!(report.state, TargetState::Written);
        let out = fs::read_to_string(js_dir(&config).join("app.compressed.js")).unwrap();
        assert_eq!(out, "env = 'prod';\nx='prod';");
    }

    #[test]
    fn test_unreadable_source_skipped() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["missing.js", "b.js"]
            "#,
        );
        let reader = MemReader::default().with("b.js", "var b = 1;");

        let report = build_one(&config, &reader);
        assert_eq!(report.state, TargetState::Written);
        assert_eq!(report.skipped_sources, 1);
        let out = fs::read_to_string(js_dir(&config).join("app.min.js")).unwrap();
        assert_eq!(out, "\nvar b=1;");
    }

    #[test]
    fn test_malformed_source_dropped() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["bad.js", "good.js"]
            "#,
        );
        let reader = MemReader::default()
            .with("bad.js", "var s = 'open")
            .with("good.js", "var g = 1;");

        let report = build_one(&config, &reader);
        assert_eq!(report.state, TargetState::Written);
        assert_eq!(report.skipped_sources, 1);
        let out = fs::read_to_string(js_dir(&config).join("app.min.js")).unwrap();
        assert_eq!(out, "\nvar g=1;");
    }

    #[test]
    fn test_empty_output_not_written() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["missing.js"]
            "#,
        );
        let report = build_one(&config, &MemReader::default());
        assert_eq!(report.state, TargetState::Written);
        assert!(report.written.is_empty());
        assert!(!js_dir(&config).join("app.min.js").exists());
    }

    #[test]
    fn test_fresh_target_stays_clean() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["a.js"]
            "#,
        );
        let reader = MemReader::default().with("a.js", "var a;");

        let first = build_one(&config, &reader);
        assert_eq!(first.state, TargetState::Written);

        // output written now, sources dated 1970
        let second = build_one(&config, &reader);
        assert_eq!(second.state, TargetState::Clean);
        assert!(second.written.is_empty());
    }

    #[test]
    fn test_force_rebuilds_fresh_target() {
        let (_dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["a.js"]
            force_rebuild = true
            "#,
        );
        let reader = MemReader::default().with("a.js", "var a;");
        build_one(&config, &reader);
        assert_eq!(build_one(&config, &reader).state, TargetState::Written);
    }

    #[test]
    fn test_bundle_with_gzip() {
        let (_dir, config) = project(
            r#"
            [css]
            basepath = "css"

            [bundles.site]
            css = { files = ["site.css"], requires = ["base"] }

            [bundles.base]
            css = { files = ["base.css"] }

            [gzip]
            enable = true
            "#,
        );
        let reader = MemReader::default()
            .with("base.css", "body { margin: 0; }")
            .with("site.css", "a { color: red; }");

        let plan = plan_targets(&config, &[]);
        let reports = build_targets(&plan.targets, &reader, &config, None);
        assert!(reports.iter().all(|r| r.state == TargetState::Written));

        let bundles = config.css.as_ref().unwrap().basepath.join("bundles");
        let site = fs::read_to_string(bundles.join("site.min.css")).unwrap();
        let base_at = site.find("margin").unwrap();
        let link_at = site.find("color").unwrap();
        assert!(base_at < link_at);
        assert!(bundles.join("site.min.gz.css").exists());
        assert!(bundles.join("base.min.gz.css").exists());
    }

    #[test]
    fn test_write_failure_marks_failed() {
        let (dir, config) = project(
            r#"
            [js]
            basepath = "js"
            output_file = "app.js"
            files = ["a.js"]

            [bundles.core]
            js = { files = ["a.js"] }
            "#,
        );
        // a file where the bundles directory should go
        fs::write(dir.path().join("js/bundles"), "").unwrap();
        let reader = MemReader::default().with("a.js", "var a;");

        let plan = plan_targets(&config, &[]);
        let reports = build_targets(&plan.targets, &reader, &config, None);
        let summary = BuildSummary::from_reports(&reports);
        assert_eq!(summary, BuildSummary { written: 1, clean: 0, failed: 1 });
        let failed = reports.iter().find(|r| r.state == TargetState::Failed).unwrap();
        assert_eq!(failed.errors.len(), 1);
    }
}
