//! Bundle building orchestration.
//!
//! Phases:
//! - **Plan** - Validate modules, expand bundles into targets
//! - **Build** - Parallel fetch, combine, minify and write per target
//! - **Report** - Diagnostics and a summary line

use crate::{
    asset::{AssetKind, FsReader},
    build::{BuildSummary, build_targets},
    bundle::{BuildTarget, Plan, plan_targets},
    cli::BuildArgs,
    config::{ConfigError, RebundleConfig},
    log,
    logger::{ProgressLine, is_quiet},
    utils::plural_count,
};
use anyhow::{Result, bail};

/// Build every planned target, or only the bundles named in `args`.
///
/// Targets untouched by config errors are still built. The run fails
/// afterwards with the collected diagnostics, or when any target failed.
pub fn build_bundles(args: &BuildArgs, config: &RebundleConfig) -> Result<()> {
    let Plan {
        targets,
        diagnostics,
        rejected,
    } = plan_targets(config, &args.bundles);
    diagnostics.print_warnings();

    let summary = if targets.is_empty() {
        log!("build"; "nothing to build");
        BuildSummary::default()
    } else {
        run(&targets, config)
    };

    if rejected > 0 {
        log!("error"; "{} skipped because of config errors", plural_count(rejected, "target"));
    }
    diagnostics.into_result().map_err(ConfigError::Diagnostics)?;

    if summary.failed > 0 {
        bail!("{} failed", plural_count(summary.failed, "target"));
    }
    Ok(())
}

fn run(targets: &[BuildTarget<'_>], config: &RebundleConfig) -> BuildSummary {
    let progress = create_progress(targets);
    let reader = FsReader::new();
    let reports = build_targets(targets, &reader, config, progress.as_ref());
    if let Some(p) = progress {
        p.finish();
    }

    let summary = BuildSummary::from_reports(&reports);
    log!(
        "build";
        "{} written, {} up to date, {} failed",
        plural_count(summary.written, "target"),
        summary.clean,
        summary.failed
    );
    summary
}

fn create_progress(targets: &[BuildTarget<'_>]) -> Option<ProgressLine> {
    if is_quiet() {
        return None;
    }
    let count = |kind: AssetKind| targets.iter().filter(|t| t.kind == kind).count();
    Some(ProgressLine::new(&[
        ("css", count(AssetKind::Css)),
        ("js", count(AssetKind::Js)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::fs;
    use tempfile::TempDir;

    fn args(bundles: &[&str]) -> BuildArgs {
        BuildArgs {
            bundles: bundles.iter().map(|b| (*b).to_owned()).collect(),
            force: false,
            common: Default::default(),
        }
    }

    #[test]
    fn test_invalid_module_fails_with_diagnostics() {
        let dir = TempDir::new().unwrap();
        let config = test_parse_config("[js]\nbasepath = \"missing\"", dir.path());

        let err = build_bundles(&args(&[]), &config).unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected config diagnostics, got {err}");
        };
        assert!(diag.has_errors());
        assert!(diag.errors().iter().any(|e| e.field.as_str() == "js.basepath"));
    }

    #[test]
    fn test_valid_module_still_built_next_to_invalid_one() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/a.js"), "var a = 1;").unwrap();
        let config = test_parse_config(
            r#"
            [js]
            basepath = "js"
            [css]
            basepath = "missing"
            [bundles.app]
            js = { files = ["a.js"] }
            "#,
            dir.path(),
        );

        assert!(build_bundles(&args(&[]), &config).is_err());
        let out = fs::read_to_string(dir.path().join("js/bundles/app.min.js")).unwrap();
        assert_eq!(out, "\nvar a=1;");
    }

    #[test]
    fn test_clean_run_succeeds() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/a.js"), "var a = 1;").unwrap();
        let config = test_parse_config(
            "[js]\nbasepath = \"js\"\n[bundles.app]\njs = { files = [\"a.js\"] }",
            dir.path(),
        );

        build_bundles(&args(&["app"]), &config).unwrap();
        assert!(dir.path().join("js/bundles/app.min.js").exists());
    }
}
