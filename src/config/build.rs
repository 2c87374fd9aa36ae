//! `[build]` section configuration.
//!
//! Contains the source/publish roots and the run policy.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in publish.toml.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"       # Source tree
/// output = "www"       # Publish tree
/// fail_fast = false    # Keep going after a failed asset
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root", skip_serializing_if = "Option::is_none")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Source directory holding the authored assets.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Publish directory receiving the transformed assets.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Stop at the first failed task instead of logging it and moving on.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub fail_fast: bool,

    /// Rebuild every task whose source exists, ignoring timestamps.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub force: bool,

    /// Remove the publish directory before building.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,
}
