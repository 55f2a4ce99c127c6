//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::asset::AssetKind;

/// rebundle asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: rebundle.toml)
    #[arg(short = 'C', long, default_value = "rebundle.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Combine, minify and gzip the configured bundles
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Print the ordered file list of a bundle
    #[command(visible_alias = "r")]
    Resolve {
        /// Bundle name
        bundle: String,

        /// Asset kind to resolve
        #[arg(short, long, value_enum, default_value_t = AssetKind::Js)]
        kind: AssetKind,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print the HTML tags that load a bundle or asset
    #[command(visible_alias = "t")]
    Tags {
        /// Bundle name, `*path` for a single asset, or a URL
        name: String,

        /// Asset kind to render
        #[arg(short, long, value_enum, default_value_t = AssetKind::Js)]
        kind: AssetKind,

        /// Render tags for a client that accepts gzip
        #[arg(short, long)]
        gzip: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Output flags shared by all commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Bundles to build. If omitted, builds every target.
    #[arg(value_name = "BUNDLE")]
    pub bundles: Vec<String>,

    /// Rebuild even if outputs are newer than their sources
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Cli {
    /// Output flags of the selected command.
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Commands::Build { args } => &args.common,
            Commands::Resolve { common, .. } | Commands::Tags { common, .. } => common,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["rebundle", "build", "-f", "-V", "core", "app"]).unwrap();
        let Commands::Build { args } = &cli.command else {
            panic!("expected build");
        };
        assert!(args.force);
        assert_eq!(args.bundles, ["core", "app"]);
        assert!(cli.common().verbose);
        assert_eq!(cli.config, PathBuf::from("rebundle.toml"));
    }

    #[test]
    fn test_parse_tags() {
        let cli = Cli::try_parse_from(["rebundle", "-C", "x.toml", "t", "app", "-k", "css", "--gzip", "-q"])
            .unwrap();
        let Commands::Tags { name, kind, gzip, common } = &cli.command else {
            panic!("expected tags");
        };
        assert_eq!(name, "app");
        assert_eq!(*kind, AssetKind::Css);
        assert!(*gzip);
        assert!(common.quiet);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn test_kind_defaults_to_js() {
        let cli = Cli::try_parse_from(["rebundle", "resolve", "app"]).unwrap();
        let Commands::Resolve { kind, .. } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(kind, AssetKind::Js);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["rebundle", "resolve", "app", "-V", "-q"]).is_err());
    }
}
