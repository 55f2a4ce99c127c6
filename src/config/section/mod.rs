//! Configuration section definitions.
//!
//! Each module corresponds to a section in `rebundle.toml`:
//!
//! | Module    | TOML Section          | Purpose                            |
//! |-----------|-----------------------|------------------------------------|
//! | `module`  | `[js]`, `[css]`       | Paths, flags, find/replace         |
//! | `bundle`  | `[bundles.<name>]`    | Named bundles and their requires   |
//! | `gzip`    | `[gzip]`              | Gzip companions                    |
//! | `cdn`     | `[cdn]`               | CDN URLs for rendered tags         |

mod bundle;
mod cdn;
mod gzip;
mod module;

pub use bundle::{BundleConfig, BundleEntry, BundleTable};
pub use cdn::CdnConfig;
pub use gzip::GzipConfig;
pub use module::ModuleConfig;
