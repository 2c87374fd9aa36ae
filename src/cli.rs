//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental publisher for static web assets
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root; every other path is relative to it
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Source directory path (relative to project root)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Publish directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: publish.toml)
    #[arg(short = 'C', long, default_value = "publish.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default publish.toml and source layout
    Init,

    /// Transform every stale asset from the source tree into the publish tree
    Publish {
        /// Rebuild every asset whose source exists, ignoring timestamps
        #[arg(short, long)]
        force: bool,

        /// Remove the publish directory before building
        #[arg(long)]
        clean: bool,

        /// Stop at the first failed asset
        #[arg(long)]
        fail_fast: bool,
    },

    /// Generate the authoring locale file from the source SVG
    Locale {
        /// Value of the `title` entry
        #[arg(short, long)]
        title: Option<String>,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish_flags() {
        let cli = Cli::try_parse_from(["webpub", "-o", "public", "publish", "--force", "--fail-fast"])
            .unwrap();

        assert_eq!(cli.output, Some(PathBuf::from("public")));
        assert_eq!(cli.config, PathBuf::from("publish.toml"));
        assert!(matches!(
            cli.command,
            Commands::Publish { force: true, clean: false, fail_fast: true }
        ));
    }

    #[test]
    fn test_parse_locale_title() {
        let cli = Cli::try_parse_from(["webpub", "--root", "site", "locale", "-t", "Cercles"]).unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("site")));
        match cli.command {
            Commands::Locale { title } => assert_eq!(title.as_deref(), Some("Cercles")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_is_init() {
        assert!(Cli::try_parse_from(["webpub", "init"]).unwrap().is_init());
        assert!(!Cli::try_parse_from(["webpub", "publish"]).unwrap().is_init());
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["webpub"]).is_err());
    }
}
