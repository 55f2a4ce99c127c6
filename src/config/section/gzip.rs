//! `[gzip]` section configuration.

use serde::Deserialize;

use crate::asset::AssetKind;

/// Gzip companions for written artifacts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GzipConfig {
    pub enable: bool,
    /// Kinds to compress. Empty means every kind.
    pub types: Vec<AssetKind>,
}

impl GzipConfig {
    pub fn applies_to(&self, kind: AssetKind) -> bool {
        self.enable && (self.types.is_empty() || self.types.contains(&kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to() {
        let off = GzipConfig::default();
        assert!(!off.applies_to(AssetKind::Js));

        let all: GzipConfig = toml::from_str("enable = true").unwrap();
        assert!(all.applies_to(AssetKind::Js));
        assert!(all.applies_to(AssetKind::Css));

        let css: GzipConfig = toml::from_str("enable = true\ntypes = [\"css\"]").unwrap();
        assert!(css.applies_to(AssetKind::Css));
        assert!(!css.applies_to(AssetKind::Js));
    }
}
