//! `[locale]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[locale]` section in publish.toml.
///
/// The authoring language file (`<dir>/<authoring>.json`) is generated from
/// the source SVG and is never published.
///
/// # Example
/// ```toml
/// [locale]
/// dir = "locale"
/// authoring = "en"
/// attribute = "i18n"
/// svg = "graphics-src.svg"
/// title = "Pitch Circles"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Locale directory, relative to the source root.
    #[serde(default = "defaults::locale::dir")]
    #[educe(Default = defaults::locale::dir())]
    pub dir: PathBuf,

    /// Language code of the authoring language.
    #[serde(default = "defaults::locale::authoring")]
    #[educe(Default = defaults::locale::authoring())]
    pub authoring: String,

    /// Attribute carrying the translation key on SVG elements.
    #[serde(default = "defaults::locale::attribute")]
    #[educe(Default = defaults::locale::attribute())]
    pub attribute: String,

    /// Source SVG scanned for translation keys, relative to the source root.
    #[serde(default = "defaults::locale::svg")]
    #[educe(Default = defaults::locale::svg())]
    pub svg: PathBuf,

    /// Value of the `title` entry, which has no element in the SVG.
    #[serde(default = "defaults::locale::title")]
    #[educe(Default = defaults::locale::title())]
    pub title: String,
}

impl LocaleConfig {
    /// Path of the authoring language file under `source`.
    pub fn authoring_file(&self, source: &Path) -> PathBuf {
        source
            .join(&self.dir)
            .join(format!("{}.json", self.authoring))
    }
}

#[cfg(test)]
mod tests {
    use super::super::PublishConfig;
    use super::*;

    #[test]
    fn test_locale_defaults() {
        let config: PublishConfig = toml::from_str("").unwrap();

        assert_eq!(config.locale.dir, PathBuf::from("locale"));
        assert_eq!(config.locale.authoring, "en");
        assert_eq!(config.locale.attribute, "i18n");
        assert_eq!(config.locale.svg, PathBuf::from("graphics-src.svg"));
        assert_eq!(config.locale.title, "Pitch Circles");
    }

    #[test]
    fn test_authoring_file() {
        let locale = LocaleConfig {
            authoring: "de".into(),
            ..Default::default()
        };
        assert_eq!(
            locale.authoring_file(Path::new("/site/src")),
            PathBuf::from("/site/src/locale/de.json")
        );
    }
}
