//! webpub - incremental publisher for static web assets.

mod build;
mod cli;
mod config;
mod init;
mod locale;
mod logger;
mod manifest;
mod transform;
mod utils;

use anyhow::{Result, bail};
use build::publish_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::PublishConfig;
use init::new_project;
use std::path::Path;
use transform::TransformRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Init => new_project(&config),
        Commands::Publish { .. } => publish(&config),
        Commands::Locale { .. } => locale::write_reference(&config).map(|_| ()),
    }
}

/// Load configuration from CLI arguments.
///
/// A missing config file is not an error: the built-in manifest is used.
fn load_config(cli: &Cli) -> Result<PublishConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        PublishConfig::from_path(&config_path)?
    } else {
        if !cli.is_init() {
            log!("config"; "{} not found, using defaults", config_path.display());
        }
        PublishConfig::default()
    };
    config.update_with_cli(cli);

    Ok(config)
}

/// Publish every stale asset; fails if any task failed.
fn publish(config: &PublishConfig) -> Result<()> {
    let registry = TransformRegistry::with_builtins(config);
    config.validate(&registry)?;

    let report = publish_site(config, &registry)?;
    if report.has_failures() {
        let failed: Vec<_> = report
            .failures()
            .map(|r| {
                let source = &r.task.source;
                let name = source.strip_prefix(&config.build.source).unwrap_or(source);
                name.display().to_string()
            })
            .collect();
        bail!(
            "{} of {} assets failed: {}",
            failed.len(),
            report.tasks.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
