//! Configuration management for `rebundle.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── module     # [js], [css]
//! │   ├── bundle     # [bundles.<name>]
//! │   ├── gzip       # [gzip]
//! │   └── cdn        # [cdn]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # RebundleConfig (this file)
//! ```
//!
//! Paths in the file are relative to the directory containing it. The
//! loaded config is immutable and passed by reference into every command.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{BundleConfig, BundleEntry, BundleTable, CdnConfig, GzipConfig, ModuleConfig};

// Re-export from types/
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    asset::AssetKind,
    cli::{Cli, Commands},
    log,
};
use anyhow::{Result, bail};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing rebundle.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RebundleConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// JavaScript module; absent means no JS targets
    pub js: Option<ModuleConfig>,

    /// CSS module; absent means no CSS targets
    pub css: Option<ModuleConfig>,

    /// Named bundles in declaration order
    pub bundles: BundleTable,

    /// Gzip companions
    pub gzip: GzipConfig,

    /// CDN URLs for rendered tags
    pub cdn: CdnConfig,
}

impl RebundleConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(ConfigError::Validation(format!(
                "config file `{}` not found in this directory or any parent",
                cli.config.display()
            )));
        };

        let mut config = Self::from_path(&config_path)?;
        config.config_path = crate::utils::path::normalize_path(&config_path);
        config.finalize(cli);
        Ok(config)
    }

    /// Module settings for `kind`, if that module is configured.
    pub fn module(&self, kind: AssetKind) -> Option<&ModuleConfig> {
        match kind {
            AssetKind::Css => self.css.as_ref(),
            AssetKind::Js => self.js.as_ref(),
        }
    }

    fn modules_mut(&mut self) -> impl Iterator<Item = &mut ModuleConfig> {
        self.css.iter_mut().chain(self.js.iter_mut())
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.normalize_paths(&root);
        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { args } => {
                if args.force {
                    for module in self.modules_mut() {
                        module.force_rebuild = true;
                    }
                }
            }
            Commands::Resolve { .. } | Commands::Tags { .. } => {}
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        for module in self.modules_mut() {
            module.normalize(&root);
        }
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate one module. Problems here disable only that module.
    pub fn validate_module(&self, kind: AssetKind) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        if let Some(module) = self.module(kind) {
            module.validate(kind, &mut diag);
        }
        diag
    }

    /// Validate settings shared by all modules.
    pub fn validate_shared(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        self.cdn.validate(&mut diag);

        let bundles = FieldPath::new("bundles");
        for (name, bundle) in &self.bundles {
            for kind in AssetKind::ALL {
                if bundle.entry(kind).is_some() && self.module(kind).is_none() {
                    diag.warn(
                        bundles.join(name).join(kind.ext()),
                        format!("no [{kind}] section, these files are never built"),
                    );
                }
            }
        }
        diag
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config and resolve module paths against `root`.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str, root: &Path) -> RebundleConfig {
    let (mut parsed, ignored) = RebundleConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.config_path = root.join("rebundle.toml");
    parsed.normalize_paths(root);
    parsed
}

// ============================================================================
// tests
// ============================================================================
