//! `[cdn]` section configuration.
//!
//! Only affects rendered tags: artifact URLs are prefixed with the
//! CloudFront or bucket URL. Nothing is uploaded.

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    pub enable: bool,
    /// Bucket name, stripped from find/replace values before they apply.
    pub bucket: String,
    pub bucket_url: String,
    /// Preferred over `bucket_url` when set.
    pub cloudfront_url: Option<String>,
}

impl CdnConfig {
    const FIELD: FieldPath = FieldPath::new("cdn");

    /// URL prefixed to artifact paths.
    pub fn base_url(&self) -> &str {
        match self.cloudfront_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.bucket_url,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable && self.base_url().is_empty() {
            diag.error_with_hint(
                Self::FIELD.join("bucket_url"),
                "cdn is enabled without a bucket_url or cloudfront_url",
                "set `bucket_url = \"//s3.amazonaws.com/<bucket>/\"`",
            );
        }
    }
}
