use super::{Transform, TransformError};
use crate::{config::RasterConfig, utils::exec};
use std::ffi::OsString;

/// `rasterize-svg` transform: SVG in, PNG out, via an external converter.
///
/// The command from `[raster]` receives ImageMagick-style arguments:
///
/// ```text
/// magick -background <color> -density <dpi> svg:- -resize <w>x<h>! png:-
/// ```
pub struct Rasterizer {
    command: Vec<String>,
    args: Vec<OsString>,
}

impl Rasterizer {
    pub fn new(config: &RasterConfig) -> Self {
        let args = [
            "-background".to_owned(),
            config.background.clone(),
            "-density".to_owned(),
            config.density.to_string(),
            "svg:-".to_owned(),
            "-resize".to_owned(),
            format!("{}x{}!", config.width, config.height),
            "png:-".to_owned(),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        Self {
            command: config.command.clone(),
            args,
        }
    }
}

impl Transform for Rasterizer {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(exec::run_with_stdin(&self.command, &self.args, input)?)
    }
}
