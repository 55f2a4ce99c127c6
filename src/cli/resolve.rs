//! `resolve` command: print a bundle's ordered file list.

use anyhow::{Result, bail};

use crate::{
    asset::AssetKind,
    bundle::{MAX_DEPTH, resolve_bundle},
    config::RebundleConfig,
    debug, log,
};

/// Print one file per line to stdout; problems go to the log.
pub fn print_resolution(config: &RebundleConfig, bundle: &str, kind: AssetKind) -> Result<()> {
    if !config.bundles.contains_key(bundle) {
        bail!("no bundle named `{bundle}`");
    }

    let resolution = resolve_bundle(&config.bundles, bundle, kind);
    for missing in &resolution.missing {
        debug!("resolve"; "unresolved requirement `{}`", missing);
    }
    if resolution.truncated {
        log!("warning"; "requires of `{}` nest deeper than {}, truncated", bundle, MAX_DEPTH);
    }

    for file in &resolution.files {
        println!("{file}");
    }
    Ok(())
}
