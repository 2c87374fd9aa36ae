//! `[minify]`, `[gzip]` and `[raster]` sections.
//!
//! Options for the built-in transforms. Tasks refer to transforms by id;
//! these sections tune how the built-ins behave.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[minify]` section - HTML minifier options.
///
/// # Example
/// ```toml
/// [minify]
/// inline_js = true
/// inline_css = true
/// keep_comments = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MinifyConfig {
    /// Minify `<script>` contents inside HTML.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub inline_js: bool,

    /// Minify `<style>` contents and `style` attributes inside HTML.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub inline_css: bool,

    /// Keep HTML comments.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub keep_comments: bool,
}

/// `[gzip]` section.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GzipConfig {
    /// Compression level, 0 (store) to 9 (best).
    #[serde(default = "defaults::gzip::level")]
    #[educe(Default = defaults::gzip::level())]
    pub level: u32,
}

/// `[raster]` section - SVG to PNG conversion.
///
/// The conversion is delegated to an external tool which reads SVG on stdin
/// and writes PNG on stdout.
///
/// # Example
/// ```toml
/// [raster]
/// command = ["magick"]
/// width = 180
/// height = 180
/// background = "#ffffff"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RasterConfig {
    /// Converter command, program first.
    #[serde(default = "defaults::raster::command")]
    #[educe(Default = defaults::raster::command())]
    pub command: Vec<String>,

    /// Output width in pixels.
    #[serde(default = "defaults::raster::width")]
    #[educe(Default = defaults::raster::width())]
    pub width: u32,

    /// Output height in pixels.
    #[serde(default = "defaults::raster::height")]
    #[educe(Default = defaults::raster::height())]
    pub height: u32,

    /// Background color painted under transparent regions.
    #[serde(default = "defaults::raster::background")]
    #[educe(Default = defaults::raster::background())]
    pub background: String,

    /// Rendering density in DPI before resizing.
    #[serde(default = "defaults::raster::density")]
    #[educe(Default = defaults::raster::density())]
    pub density: f32,
}
