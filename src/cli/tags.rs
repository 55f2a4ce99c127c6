//! `tags` command: print the HTML tags loading a bundle or asset.

use anyhow::Result;

use crate::{
    asset::AssetKind,
    config::RebundleConfig,
    debug,
    tags::{TagOptions, render_tags},
};

pub fn print_tags(config: &RebundleConfig, name: &str, kind: AssetKind, gzip: bool) -> Result<()> {
    let tags = render_tags(config, name, kind, TagOptions { accepts_gzip: gzip });
    if tags.is_empty() {
        debug!("tags"; "no {} files for `{}`", kind, name);
    }
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}
