//! Manifest entries and their expansion into asset tasks.
//!
//! A manifest entry is what the user writes in `[[task]]`; an [`AssetTask`]
//! is what the orchestrator runs. Directory entries fan out into one task per
//! file, so every task maps exactly one source to one destination.
//!
//! ```toml
//! [[task]]
//! source = "main.js"
//! destination = "main.js"
//! transform = "minify-js"
//!
//! [[task]]
//! source = "locale"
//! destination = "locale"
//! transform = ["copy", "gzip"]
//! extension = "json"
//! suffix = ".gz"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

// ============================================================================
// Transform Chain
// ============================================================================

/// Ordered transform ids; bytes flow through each one in turn.
///
/// Written as a single string or as an array in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "OneOrMany")]
pub struct TransformChain(Vec<String>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for TransformChain {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(id) => Self(vec![id]),
            OneOrMany::Many(ids) => Self(ids),
        }
    }
}

impl From<TransformChain> for OneOrMany {
    fn from(mut chain: TransformChain) -> Self {
        if chain.0.len() == 1 {
            Self::One(chain.0.remove(0))
        } else {
            Self::Many(chain.0)
        }
    }
}

impl TransformChain {
    pub fn one(id: &str) -> Self {
        Self(vec![id.to_owned()])
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|i| i == id)
    }
}

impl std::fmt::Display for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

// ============================================================================
// Manifest Entry
// ============================================================================

/// One `[[task]]` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskEntry {
    /// Source path, relative to the source root.
    pub source: PathBuf,

    /// Destination path, relative to the publish root.
    pub destination: PathBuf,

    /// Transform id or chain of ids.
    pub transform: TransformChain,

    /// Only collect files with this extension when `source` is a directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Appended to each destination file name when `source` is a directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl TaskEntry {
    pub fn file(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        transform: TransformChain,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            transform,
            extension: None,
            suffix: None,
        }
    }

    pub fn dir(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        transform: TransformChain,
        extension: &str,
    ) -> Self {
        Self {
            extension: Some(extension.to_owned()),
            ..Self::file(source, destination, transform)
        }
    }

    /// Expand this entry into tasks with absolute paths.
    ///
    /// A source that is an existing directory yields one task per matching
    /// file, sorted by path. Anything else, including a missing source,
    /// yields exactly one task so the orchestrator can report it.
    fn expand(&self, source_root: &Path, output_root: &Path) -> Vec<AssetTask> {
        let source = source_root.join(&self.source);
        let destination = output_root.join(&self.destination);

        if !source.is_dir() {
            return vec![AssetTask::new(source, destination, self.transform.clone())];
        }

        collect_files(&source, self.extension.as_deref())
            .into_iter()
            .filter_map(|path| {
                let relative = path.strip_prefix(&source).ok()?.to_path_buf();
                let mut dest = destination.join(&relative);
                if let Some(suffix) = &self.suffix {
                    let mut name = dest.file_name()?.to_os_string();
                    name.push(suffix);
                    dest.set_file_name(name);
                }
                Some(AssetTask::new(path, dest, self.transform.clone()))
            })
            .collect()
    }
}

/// Collect files under `dir` recursively, sorted, optionally by extension.
fn collect_files(dir: &Path, extension: Option<&str>) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .filter(|e| {
            extension.is_none_or(|ext| e.path().extension().is_some_and(|e| e == ext))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

// ============================================================================
// Asset Task
// ============================================================================

/// A single source → destination mapping with its transform chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub transform: TransformChain,
}

impl AssetTask {
    pub fn new(source: PathBuf, destination: PathBuf, transform: TransformChain) -> Self {
        Self {
            source,
            destination,
            transform,
        }
    }
}

/// Expand manifest entries into the ordered task list for one run.
///
/// Tasks reading `excluded` (the authoring locale file) are dropped no matter
/// which entry produced them.
pub fn expand(
    entries: &[TaskEntry],
    source_root: &Path,
    output_root: &Path,
    excluded: &Path,
) -> Vec<AssetTask> {
    entries
        .iter()
        .flat_map(|entry| entry.expand(source_root, output_root))
        .filter(|task| task.source != excluded)
        .collect()
}
