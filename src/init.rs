//! Project initialization.
//!
//! Writes a default `publish.toml` and the source layout it expects.

use crate::{config::PublishConfig, log};
use anyhow::{Context, Result, bail};
use std::fs;

/// Write the default config and create the source directories.
pub fn new_project(config: &PublishConfig) -> Result<()> {
    if config.config_path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            config.config_path.display()
        );
    }

    init_source_structure(config)?;
    init_default_config(config)?;

    log!("init"; "{}", config.config_path.display());
    Ok(())
}

/// Write default configuration file
fn init_default_config(config: &PublishConfig) -> Result<()> {
    // Spell out the built-in manifest so it can be edited in place
    let mut default = PublishConfig::default();
    default.tasks = default.manifest().into_owned();
    let content = toml::to_string_pretty(&default)?;
    if let Some(parent) = config.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.config_path, content)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    Ok(())
}

/// Create the source root with its locale and stylesheet directories
fn init_source_structure(config: &PublishConfig) -> Result<()> {
    let source = &config.build.source;
    for path in [
        source.clone(),
        source.join(&config.locale.dir),
        source.join("styles"),
    ] {
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> PublishConfig {
        let mut config = PublishConfig::default();
        config.config_path = dir.path().join("publish.toml");
        config.build.source = dir.path().join("src");
        config.build.output = dir.path().join("www");
        config
    }

    #[test]
    fn test_new_project_layout() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        new_project(&config).unwrap();

        assert!(dir.path().join("src/locale").is_dir());
        assert!(dir.path().join("src/styles").is_dir());
        assert!(!dir.path().join("www").exists());

        let written = PublishConfig::from_path(&config.config_path).unwrap();
        assert_eq!(written.tasks, PublishConfig::default().manifest().into_owned());
        assert_eq!(written.locale.authoring, "en");
    }

    #[test]
    fn test_new_project_refuses_existing_config() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.config_path, "[build]\n").unwrap();

        assert!(new_project(&config).is_err());
        assert_eq!(fs::read_to_string(&config.config_path).unwrap(), "[build]\n");
        assert!(!dir.path().join("src").exists());
    }
}
