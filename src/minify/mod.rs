//! Minification for bundle sources.
//!
//! JavaScript goes through the JSMin-style lexer in [`js`], CSS through
//! lightningcss in [`css`]. Files already marked `.min.` are never touched.

mod css;
mod js;

pub use css::minify_css;
pub use js::{MalformedInput, Unterminated, minify_js};

use std::borrow::Cow;

use crate::asset::AssetKind;
use crate::log;

/// Marker in a file name meaning "already minified".
pub const MIN_MARKER: &str = ".min.";

/// Whether a source reference names an already-minified file.
///
/// Only the final path segment is checked, so a `.min.` directory does not
/// count.
pub fn is_preminified(reference: &str) -> bool {
    let name = reference.rsplit(['/', '\\']).next().unwrap_or(reference);
    name.contains(MIN_MARKER)
}

/// Minify content of the given kind.
///
/// CSS that lightningcss rejects is passed through unchanged with a warning,
/// JavaScript lexer failures are returned to the caller.
pub fn minify_by_kind<'a>(kind: AssetKind, content: &'a str) -> Result<Cow<'a, str>, MalformedInput> {
    match kind {
        AssetKind::Js => minify_js(content).map(Cow::Owned),
        AssetKind::Css => Ok(match minify_css(content) {
            Some(min) => Cow::Owned(min),
            None => {
                log!("css"; "could not parse stylesheet, keeping it unminified");
                Cow::Borrowed(content)
            }
        }),
    }
}
