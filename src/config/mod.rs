//! Publish configuration management for `publish.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[build]`    | Source/publish roots, failure policy           |
//! | `[minify]`   | HTML minifier options                          |
//! | `[gzip]`     | Compression level                              |
//! | `[raster]`   | SVG → PNG converter                            |
//! | `[locale]`   | Locale directory and authoring language        |
//! | `[[task]]`   | The manifest: source → destination → transform |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "www"
//!
//! [[task]]
//! source = "index.html"
//! destination = "index.html"
//! transform = "minify-html"
//!
//! [[task]]
//! source = "graphics-src.svg"
//! destination = "favicon.png"
//! transform = "rasterize-svg"
//! ```

mod build;
pub mod defaults;
mod error;
mod locale;
mod pipeline;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use locale::LocaleConfig;
pub use pipeline::{GzipConfig, MinifyConfig, RasterConfig};

use crate::{
    cli::{Cli, Commands},
    manifest::{self, AssetTask, TaskEntry},
    transform::{RASTERIZE_SVG, TransformRegistry},
    utils::exec,
};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing publish.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// HTML minifier settings
    #[serde(default)]
    pub minify: MinifyConfig,

    /// Gzip settings
    #[serde(default)]
    pub gzip: GzipConfig,

    /// SVG rasterizer settings
    #[serde(default)]
    pub raster: RasterConfig,

    /// Locale settings
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Manifest entries, in processing order; empty means the built-in manifest
    #[serde(default, rename = "task", skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskEntry>,
}

impl PublishConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: PublishConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content).with_context(|| format!("in `{}`", path.display()))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Path of the authoring locale file, which is never published.
    pub fn authoring_locale(&self) -> PathBuf {
        self.locale.authoring_file(&self.build.source)
    }

    /// Declared `[[task]]` entries, or the built-in manifest when there are none.
    pub fn manifest(&self) -> Cow<'_, [TaskEntry]> {
        if self.tasks.is_empty() {
            Cow::Owned(defaults::task::manifest(&self.locale))
        } else {
            Cow::Borrowed(&self.tasks)
        }
    }

    /// Expand the manifest into this run's ordered task list.
    pub fn asset_tasks(&self) -> Vec<AssetTask> {
        manifest::expand(
            &self.manifest(),
            &self.build.source,
            &self.build.output,
            &self.authoring_locale(),
        )
    }

    /// Update configuration with CLI arguments and resolve every path
    /// against the root.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Commands::Publish {
            force,
            clean,
            fail_fast,
        } = &cli.command
        {
            self.build.force |= force;
            self.build.clean |= clean;
            self.build.fail_fast |= fail_fast;
        }

        if let Commands::Locale { title: Some(title) } = &cli.command {
            self.locale.title = title.clone();
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths relative to the root and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(&expand_tilde(root));
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_file));
        self.build.source = Self::normalize_path(&root.join(expand_tilde(&self.build.source)));
        self.build.output = Self::normalize_path(&root.join(expand_tilde(&self.build.output)));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate the configuration against the transforms it will run with.
    pub fn validate(&self, registry: &TransformRegistry) -> Result<()> {
        let (source, output) = (&self.build.source, &self.build.output);
        if source.starts_with(output) || output.starts_with(source) {
            bail!(ConfigError::Invalid(
                "[build.source] and [build.output] must not contain each other".into()
            ));
        }

        if self.gzip.level > 9 {
            bail!(ConfigError::Invalid(
                "[gzip.level] must be between 0 and 9".into()
            ));
        }

        if self.raster.width == 0 || self.raster.height == 0 {
            bail!(ConfigError::Invalid(
                "[raster.width] and [raster.height] must be positive".into()
            ));
        }

        let entries = self.manifest();
        for entry in entries.iter() {
            if entry.transform.is_empty() {
                bail!(ConfigError::Invalid(format!(
                    "[[task]] `{}` has an empty transform list",
                    entry.source.display()
                )));
            }
            if let Some(id) = entry.transform.ids().iter().find(|id| !registry.contains(id)) {
                bail!(ConfigError::Invalid(format!(
                    "[[task]] `{}` uses unknown transform `{id}`",
                    entry.source.display()
                )));
            }
        }

        if entries.iter().any(|t| t.transform.contains(RASTERIZE_SVG)) {
            exec::check_installed(&self.raster.command).context("[raster.command]")?;
        }

        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}
