//! CSS minification via lightningcss.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Minify CSS source code.
///
/// Returns `None` when the stylesheet cannot be parsed or printed.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}
