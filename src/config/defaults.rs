//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "www".into()
    }
}

// ============================================================================
// Transform Section Defaults
// ============================================================================

pub mod gzip {
    pub fn level() -> u32 {
        9
    }
}

pub mod raster {
    pub fn command() -> Vec<String> {
        vec!["magick".into()]
    }

    pub fn width() -> u32 {
        192
    }

    pub fn height() -> u32 {
        192
    }

    pub fn background() -> String {
        "white".into()
    }

    pub fn density() -> f32 {
        96.0
    }
}

// ============================================================================
// [locale] Section Defaults
// ============================================================================

pub mod locale {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "locale".into()
    }

    pub fn authoring() -> String {
        "en".into()
    }

    pub fn attribute() -> String {
        "i18n".into()
    }

    pub fn svg() -> PathBuf {
        "graphics-src.svg".into()
    }

    pub fn title() -> String {
        "Pitch Circles".into()
    }
}

// ============================================================================
// [[task]] Defaults
// ============================================================================

pub mod task {
    use crate::{
        config::LocaleConfig,
        manifest::{TaskEntry, TransformChain},
    };

    /// Manifest used when the config file declares no `[[task]]` entries.
    pub fn manifest(locale: &LocaleConfig) -> Vec<TaskEntry> {
        vec![
            TaskEntry::file("favicon.png", "favicon.png", TransformChain::one("copy")),
            TaskEntry::file("index.html", "index.html", TransformChain::one("minify-html")),
            TaskEntry::file("main.js", "main.js", TransformChain::one("minify-js")),
            TaskEntry::file("graphics-src.svg", "graphics.svg", TransformChain::one("optimize-svg")),
            TaskEntry::dir(locale.dir.clone(), locale.dir.clone(), TransformChain::one("copy"), "json"),
            TaskEntry::dir("styles", "styles", TransformChain::one("minify-css"), "css"),
        ]
    }
}
