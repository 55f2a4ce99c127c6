//! Build target planning.
//!
//! Every configured module yields up to one standalone target (its own
//! `files` written as `output_file`) plus one target per bundle that has
//! files of the module's kind.
//!
//! ```text
//! [js] output_file = "app.js"      → <output_path>/app.min.js
//! [bundles.core] js = {...}        → <output_path>/bundles/core.min.js
//! ```

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::asset::{Artifact, AssetKind, SourceRef, artifact_file_name, output::BUNDLES_DIR};
use crate::config::{ConfigDiagnostics, FieldPath, ModuleConfig, RebundleConfig};
use crate::{debug, log};

use super::resolve::resolve_bundle;

/// Where a target comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOrigin {
    /// A module's own `files` list.
    Standalone,
    /// A named bundle.
    Bundle,
}

/// One unit of work for the build: sources and the artifacts they produce.
#[derive(Debug, Clone)]
pub struct BuildTarget<'a> {
    pub name: String,
    pub kind: AssetKind,
    pub origin: TargetOrigin,
    pub module: &'a ModuleConfig,
    /// Sources in build order.
    pub sources: Vec<SourceRef>,
    /// Enabled artifacts and where they go.
    pub outputs: Vec<(Artifact, PathBuf)>,
}

impl BuildTarget<'_> {
    pub fn output(&self, artifact: Artifact) -> Option<&Path> {
        self.outputs
            .iter()
            .find(|(a, _)| *a == artifact)
            .map(|(_, path)| path.as_path())
    }

    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.outputs.iter().map(|(_, p)| p.clone()).collect()
    }

    /// `[kind] name`, for log lines.
    pub fn label(&self) -> String {
        match self.origin {
            TargetOrigin::Standalone => format!("{} {}", self.kind, self.name),
            TargetOrigin::Bundle => format!("{} bundle {}", self.kind, self.name),
        }
    }
}

/// Planned targets plus the problems found while planning.
#[derive(Debug, Default)]
pub struct Plan<'a> {
    pub targets: Vec<BuildTarget<'a>>,
    pub diagnostics: ConfigDiagnostics,
    /// Modules and targets dropped because of config errors.
    pub rejected: usize,
}

/// Plan all targets.
///
/// When `only` is non-empty just the named bundles are planned and the
/// standalone targets are left out.
pub fn plan_targets<'a>(config: &'a RebundleConfig, only: &[String]) -> Plan<'a> {
    let mut plan = Plan::default();
    plan.diagnostics.extend(config.validate_shared());

    for name in only {
        if !config.bundles.contains_key(name) {
            plan.diagnostics
                .warn(FieldPath::new("bundles"), format!("no bundle named `{name}`"));
        }
    }

    for kind in AssetKind::ALL {
        let Some(module) = config.module(kind) else {
            continue;
        };

        let diag = config.validate_module(kind);
        if diag.has_errors() {
            plan.rejected += 1;
        }
        let usable = !diag.has_errors() && module.writes_anything();
        plan.diagnostics.extend(diag);
        if !usable {
            continue;
        }

        if only.is_empty()
            && let Some(target) = standalone_target(module, kind)
        {
            plan.targets.push(target);
        }
        plan.targets
            .extend(bundle_targets(config, module, kind, only));
    }

    reject_shared_outputs(&mut plan);
    plan
}

fn standalone_target(module: &ModuleConfig, kind: AssetKind) -> Option<BuildTarget<'_>> {
    let file = module.output_file.as_deref()?;
    if module.files.is_empty() {
        return None;
    }

    let path = Path::new(file);
    let full = if path.is_absolute() || path.starts_with(module.output_dir()) {
        path.to_path_buf()
    } else {
        module.output_dir().join(path)
    };
    let dir = full.parent().unwrap_or(module.output_dir());
    let name = full.file_name()?.to_str()?;

    Some(BuildTarget {
        name: name.to_owned(),
        kind,
        origin: TargetOrigin::Standalone,
        module,
        sources: parse_sources(&module.files, module, kind),
        outputs: artifact_paths(module, dir, name, kind),
    })
}

fn bundle_targets<'a>(
    config: &'a RebundleConfig,
    module: &'a ModuleConfig,
    kind: AssetKind,
    only: &[String],
) -> Vec<BuildTarget<'a>> {
    let dir = module.output_dir().join(BUNDLES_DIR);
    let mut targets = Vec::new();

    for (name, bundle) in &config.bundles {
        if !only.is_empty() && !only.contains(name) {
            continue;
        }
        if bundle.entry(kind).is_none() {
            continue;
        }

        let resolution = resolve_bundle(&config.bundles, name, kind);
        if !resolution.missing.is_empty() {
            debug!("bundle"; "{kind} bundle {name}: unresolved requires {:?}", resolution.missing);
        }
        if resolution.truncated {
            log!(
                "warning";
                "{kind} bundle {name}: requires nested deeper than {} levels were ignored",
                super::resolve::MAX_DEPTH
            );
        }
        if resolution.files.is_empty() {
            debug!("bundle"; "{kind} bundle {name}: no files, skipped");
            continue;
        }

        targets.push(BuildTarget {
            name: name.clone(),
            kind,
            origin: TargetOrigin::Bundle,
            module,
            sources: parse_sources(&resolution.files, module, kind),
            outputs: artifact_paths(module, &dir, name, kind),
        });
    }
    targets
}

/// Turn references into sources, dropping the ones that can't be used.
fn parse_sources(references: &[String], module: &ModuleConfig, kind: AssetKind) -> Vec<SourceRef> {
    references
        .iter()
        .filter_map(|reference| {
            let source = match SourceRef::parse(reference, &module.basepath) {
                Ok(source) => source,
                Err(e) => {
                    log!("error"; "{e}");
                    return None;
                }
            };
            if source.extension().as_deref() != Some(kind.ext()) {
                log!("warning"; "skipping `{reference}`: does not end in .{kind}");
                return None;
            }
            Some(source)
        })
        .collect()
}

fn artifact_paths(
    module: &ModuleConfig,
    dir: &Path,
    name: &str,
    kind: AssetKind,
) -> Vec<(Artifact, PathBuf)> {
    let mut outputs = Vec::with_capacity(2);
    if module.combine {
        let file = artifact_file_name(name, kind, Artifact::Combined);
        outputs.push((Artifact::Combined, dir.join(file)));
    }
    if module.minify {
        let file = artifact_file_name(name, kind, Artifact::Minified);
        outputs.push((Artifact::Minified, dir.join(file)));
    }
    outputs
}

/// Drop every target that writes a path another target also writes.
fn reject_shared_outputs(plan: &mut Plan<'_>) {
    let mut writers: FxHashMap<&Path, Vec<usize>> = FxHashMap::default();
    for (idx, target) in plan.targets.iter().enumerate() {
        for (_, path) in &target.outputs {
            let list = writers.entry(path.as_path()).or_default();
            if !list.contains(&idx) {
                list.push(idx);
            }
        }
    }

    let mut conflicts: Vec<(&Path, Vec<usize>)> = writers
        .into_iter()
        .filter(|(_, idx)| idx.len() > 1)
        .collect();
    if conflicts.is_empty() {
        return;
    }
    conflicts.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut rejected = vec![false; plan.targets.len()];
    let mut diag = ConfigDiagnostics::new();
    for (path, idx) in &conflicts {
        let names: Vec<_> = idx.iter().map(|&i| plan.targets[i].label()).collect();
        diag.error(
            FieldPath::new("bundles"),
            format!("{} all write `{}`", names.join(", "), path.display()),
        );
        for &i in idx {
            rejected[i] = true;
        }
    }
    drop(conflicts);

    let mut idx = 0;
    plan.targets.retain(|_| {
        let keep = !rejected[idx];
        idx += 1;
        keep
    });
    plan.rejected += rejected.iter().filter(|&&r| r).count();
    plan.diagnostics.extend(diag);
}
