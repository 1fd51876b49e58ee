//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml with environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

use crate::env::repository_web_link;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub bundle_identifier: String,
    pub build_type: BuildType,
    #[serde(default)]
    pub tray_icon: Option<String>,
    /// JSON translation of the menu labels; English when unset.
    #[serde(default)]
    pub strings: Option<String>,
}

/// Build classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Devel,
    Release,
}

impl BuildType {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Devel => "devel",
            BuildType::Release => "release",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    /// Repository reference, optionally prefixed up to a `+` (e.g. `git+https://...`).
    pub repository: String,
    /// Search engine prefix; the encoded selection is appended to it.
    pub search_url: String,
    pub issue_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: String,
}

impl Config {
    /// Load configuration from embedded config.toml with environment variable overrides.
    pub fn load() -> Result<Self> {
        let mut config: Config =
            toml::from_str(CONFIG_TOML).context("Failed to parse embedded config.toml")?;

        if let Ok(repository) = env::var("WEBSHELL_REPOSITORY") {
            config.links.repository = repository;
        }

        if let Ok(search_url) = env::var("WEBSHELL_SEARCH_URL") {
            config.links.search_url = search_url;
        }

        if let Ok(strings) = env::var("WEBSHELL_STRINGS") {
            config.app.strings = Some(strings);
        }

        if let Ok(build_type) = env::var("WEBSHELL_BUILD_TYPE") {
            config.app.build_type = match build_type.as_str() {
                "devel" => BuildType::Devel,
                "release" => BuildType::Release,
                other => anyhow::bail!("Unknown WEBSHELL_BUILD_TYPE '{}'", other),
            };
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.logging.level = log_level;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate that the links resolve to usable URLs.
    fn validate(&self) -> Result<()> {
        url::Url::parse(self.web_link()).with_context(|| {
            format!(
                "Repository link '{}' does not contain a valid URL. Set WEBSHELL_REPOSITORY \
                 or update config.toml",
                self.links.repository
            )
        })?;

        if self.links.search_url.is_empty() {
            anyhow::bail!("search_url must not be empty");
        }

        Ok(())
    }

    /// Browser-facing repository URL.
    pub fn web_link(&self) -> &str {
        repository_web_link(&self.links.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            app: AppConfig {
                name: "test".into(),
                version: "0.1.0".into(),
                bundle_identifier: "test".into(),
                build_type: BuildType::Release,
                tray_icon: None,
                strings: None,
            },
            links: LinksConfig {
                repository: "git+https://github.com/example/shell".into(),
                search_url: "https://duckduckgo.com/?q=".into(),
                issue_template: "bug_report.md".into(),
            },
            logging: LoggingConfig {
                level: "info".into(),
                log_dir: "test".into(),
            },
        }
    }

    #[test]
    fn test_config_parsing() {
        let result = toml::from_str::<Config>(CONFIG_TOML);
        assert!(result.is_ok(), "Config parsing failed: {:?}", result.err());
    }

    #[test]
    fn test_embedded_config_is_valid() {
        let config = toml::from_str::<Config>(CONFIG_TOML).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_web_link() {
        let config = sample();
        assert_eq!(config.web_link(), "https://github.com/example/shell");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_repository() {
        let mut config = sample();
        config.links.repository = "not a url".into();
        assert!(config.validate().is_err());
    }
}
