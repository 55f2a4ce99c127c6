//! rebundle - merge, minify and gzip CSS/JS bundles.

mod asset;
mod build;
mod bundle;
mod cli;
mod config;
mod freshness;
mod gzip;
mod logger;
mod minify;
mod tags;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::RebundleConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let common = cli.common();
    logger::set_verbose(common.verbose);
    logger::set_quiet(common.quiet);

    let config = RebundleConfig::load(&cli)?;
    debug!("config"; "loaded {}", config.config_path.display());

    match &cli.command {
        Commands::Build { args } => cli::build::build_bundles(args, &config),
        Commands::Resolve { bundle, kind, .. } => {
            cli::resolve::print_resolution(&config, bundle, *kind)
        }
        Commands::Tags {
            name, kind, gzip, ..
        } => cli::tags::print_tags(&config, name, *kind, *gzip),
    }
}
