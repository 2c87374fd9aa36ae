//! Minification of HTML, JavaScript and CSS.
//!
//! HTML goes through `minify_html`, which also handles inline `<script>` and
//! `<style>` when enabled in `[minify]`. Standalone `.js` and `.css` files use
//! `minifier`.

use super::{Transform, TransformError};
use crate::config::MinifyConfig;

// ============================================================================
// HTML
// ============================================================================

/// `minify-html` transform, configured once from `[minify]`.
pub struct HtmlMinifier {
    cfg: minify_html::Cfg,
}

impl HtmlMinifier {
    pub fn new(config: &MinifyConfig) -> Self {
        let mut cfg = minify_html::Cfg::new();
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.keep_comments = config.keep_comments;
        cfg.minify_css = config.inline_css;
        cfg.minify_js = config.inline_js;
        cfg.remove_bangs = true;
        cfg.remove_processing_instructions = true;
        Self { cfg }
    }
}

impl Transform for HtmlMinifier {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(minify_html::minify(input, &self.cfg))
    }
}

// ============================================================================
// JavaScript / CSS
// ============================================================================

/// `minify-js` transform.
pub fn minify_js(input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let source = std::str::from_utf8(input)?;
    Ok(minifier::js::minify(source).to_string().into_bytes())
}

/// `minify-css` transform.
pub fn minify_css(input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let source = std::str::from_utf8(input)?;
    let minified = minifier::css::minify(source)
        .map_err(|e| TransformError::Minify(e.to_owned()))?;
    Ok(minified.to_string().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(config: MinifyConfig, input: &[u8]) -> String {
        let out = HtmlMinifier::new(&config).apply(input).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_minify_html_basic() {
        let input = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = html(MinifyConfig::default(), input);

        assert!(!result.contains("\n  "));
        assert!(result.contains("<p>Hello</p>"));
        assert!(result.len() < input.len());
    }

    #[test]
    fn test_minify_html_strips_comments_by_default() {
        let input = b"<p>Hello World</p><!-- build note -->";
        let result = html(MinifyConfig::default(), input);

        assert!(result.contains("Hello World"));
        assert!(!result.contains("build note"));
    }

    #[test]
    fn test_minify_html_keep_comments() {
        let config = MinifyConfig {
            keep_comments: true,
            ..Default::default()
        };
        let result = html(config, b"<p>Hi</p><!-- keep me -->");
        assert!(result.contains("keep me"));
    }

    #[test]
    fn test_minify_js_removes_comments_and_whitespace() {
        let input = b"// entry point\nfunction add(a, b) {\n    return a + b;\n}\n";
        let out = String::from_utf8(minify_js(input).unwrap()).unwrap();

        assert!(!out.contains("entry point"));
        assert!(out.contains("function add"));
        assert!(out.len() < input.len());
    }

    #[test]
    fn test_minify_js_rejects_invalid_utf8() {
        let err = minify_js(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, TransformError::Utf8(_)));
    }

    #[test]
    fn test_minify_css() {
        let input = b"/* theme */\nbody {\n    color: red;\n}\n";
        let out = String::from_utf8(minify_css(input).unwrap()).unwrap();

        assert!(!out.contains("theme"));
        assert!(out.contains("body{"));
        assert!(out.len() < input.len());
    }
}
