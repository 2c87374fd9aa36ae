//! Asset transforms and the registry that names them.
//!
//! A transform turns the bytes of one source file into the bytes of its
//! destination. Tasks refer to transforms by id, so new kinds of asset can be
//! published by registering a transform rather than touching the build loop.
//!
//! # Built-ins
//!
//! | id              | module     | backend                     |
//! |-----------------|------------|-----------------------------|
//! | `copy`          | here       | identity                    |
//! | `minify-html`   | `minify`   | `minify-html`               |
//! | `minify-js`     | `minify`   | `minifier`                  |
//! | `minify-css`    | `minify`   | `minifier`                  |
//! | `optimize-svg`  | `svg`      | `quick-xml` streaming pass  |
//! | `rasterize-svg` | `raster`   | external converter          |
//! | `gzip`          | `gzip`     | `flate2`                    |

pub mod gzip;
pub mod minify;
pub mod raster;
pub mod svg;

use crate::{config::PublishConfig, utils::exec::ExecError};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

pub const COPY: &str = "copy";
pub const MINIFY_HTML: &str = "minify-html";
pub const MINIFY_JS: &str = "minify-js";
pub const MINIFY_CSS: &str = "minify-css";
pub const OPTIMIZE_SVG: &str = "optimize-svg";
pub const RASTERIZE_SVG: &str = "rasterize-svg";
pub const GZIP: &str = "gzip";

// ============================================================================
// Error
// ============================================================================

/// Failure inside a single transform.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("input is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid markup at byte {position}")]
    Markup {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("minifier rejected input: {0}")]
    Minify(String),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Transform Trait
// ============================================================================

/// Bytes in, bytes out.
pub trait Transform: Send + Sync {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, TransformError> + Send + Sync,
{
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        self(input)
    }
}

fn copy(input: &[u8]) -> Result<Vec<u8>, TransformError> {
    Ok(input.to_vec())
}

// ============================================================================
// Registry
// ============================================================================

/// Maps transform ids to implementations.
#[derive(Default, Clone)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in transform, configured from `config`.
    pub fn with_builtins(config: &PublishConfig) -> Self {
        let mut registry = Self::new();
        registry.register(COPY, copy);
        registry.register(MINIFY_HTML, minify::HtmlMinifier::new(&config.minify));
        registry.register(MINIFY_JS, minify::minify_js);
        registry.register(MINIFY_CSS, minify::minify_css);
        registry.register(OPTIMIZE_SVG, svg::optimize_svg);
        registry.register(RASTERIZE_SVG, raster::Rasterizer::new(&config.raster));
        registry.register(GZIP, gzip::Gzip::new(config.gzip.level));
        registry
    }

    /// Register `transform` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, transform: impl Transform + 'static) {
        self.transforms.insert(id.into(), Arc::new(transform));
    }

    pub fn get(&self, id: &str) -> Option<&dyn Transform> {
        self.transforms.get(id).map(|t| t.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.transforms.contains_key(id)
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.transforms.keys().collect();
        ids.sort();
        f.debug_struct("TransformRegistry").field("ids", &ids).finish()
    }
}
