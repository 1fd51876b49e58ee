//! Read-only facts shared by every menu builder.

use std::sync::Arc;

use crate::config::{BuildType, Config};
use crate::l10n::Strings;
use crate::settings::Settings;

/// Operating system family, as far as menu conventions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Other => "other",
        }
    }

    /// Windows puts the tray visibility toggle next to "Quit" instead of at the top.
    pub fn toggle_at_bottom(self) -> bool {
        self == Platform::Windows
    }
}

/// Strip the prefix up to and including the first `+` from a repository reference.
///
/// `"git+https://host/repo"` becomes `"https://host/repo"`; references without
/// a `+` are returned unchanged.
pub fn repository_web_link(reference: &str) -> &str {
    match reference.find('+') {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    }
}

/// Inputs read once per menu build.
#[derive(Debug, Clone)]
pub struct BuildEnvironment {
    pub platform: Platform,
    pub build_type: BuildType,
    pub settings: Settings,
    pub strings: Arc<Strings>,
    pub app_name: String,
    pub app_version: String,
    pub tray_icon: Option<String>,
    pub repository: String,
    pub search_url: String,
    pub issue_template: String,
}

impl BuildEnvironment {
    pub fn new(config: &Config, settings: Settings, strings: Arc<Strings>) -> Self {
        Self {
            platform: Platform::current(),
            build_type: config.app.build_type,
            settings,
            strings,
            app_name: config.app.name.clone(),
            app_version: config.app.version.clone(),
            tray_icon: config.app.tray_icon.clone(),
            repository: config.links.repository.clone(),
            search_url: config.links.search_url.clone(),
            issue_template: config.links.issue_template.clone(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Developer-only items are unlocked by a devel build or the advanced setting.
    pub fn dev_mode(&self) -> bool {
        self.build_type == BuildType::Devel || self.settings.advanced.devel
    }

    pub fn hide_on_close(&self) -> bool {
        self.settings.window.hide_on_close
    }

    /// Localized label.
    pub fn t(&self, path: &str) -> String {
        self.strings.get(path)
    }

    pub fn web_link(&self) -> &str {
        repository_web_link(&self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::environment;

    #[test]
    fn test_repository_web_link() {
        assert_eq!(
            repository_web_link("v1.2.3+https://example.com/repo"),
            "https://example.com/repo"
        );
        assert_eq!(
            repository_web_link("https://example.com/repo"),
            "https://example.com/repo"
        );
        assert_eq!(repository_web_link("a+b+c"), "b+c");
    }

    #[test]
    fn test_dev_mode() {
        let mut env = environment(Platform::Linux);
        assert!(!env.dev_mode());

        env.settings.advanced.devel = true;
        assert!(env.dev_mode());

        env.settings.advanced.devel = false;
        env.build_type = BuildType::Devel;
        assert!(env.dev_mode());
    }

    #[test]
    fn test_toggle_placement() {
        assert!(Platform::Windows.toggle_at_bottom());
        assert!(!Platform::Linux.toggle_at_bottom());
        assert!(!Platform::MacOs.toggle_at_bottom());
    }
}
