//! Persisted user settings and the log directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::ConfigError;

const APP_DIR: &str = "webshell-menus";

/// User settings consulted by the menu builders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub advanced: AdvancedSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Hide the window to the tray instead of closing it.
    pub hide_on_close: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            hide_on_close: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Unlock developer tools in release builds.
    pub devel: bool,
}

/// Settings backed by a TOML file.
///
/// Readers always get a snapshot; the close interceptor re-reads it on
/// every close request so changes apply without rebuilding the tray.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Store that lives only in memory.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            current: RwLock::new(settings),
        }
    }

    /// Load settings from `path`, falling back to defaults when the file is missing.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!("Settings loaded from {}", path.display());
        Ok(Self {
            path: Some(path),
            current: RwLock::new(settings),
        })
    }

    /// Current settings.
    pub fn snapshot(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` to the settings and persist them.
    pub fn update<F>(&self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut Settings),
    {
        let updated = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut current);
            current.clone()
        };
        if let Some(path) = &self.path {
            save(path, &updated)?;
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn save(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(settings)?)?;
    debug!("Settings saved to {}", path.display());
    Ok(())
}

/// Default location of the settings file.
pub fn settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR).join("settings.toml")
}

/// Get the path to the log directory.
pub fn log_directory(name: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    if cfg!(target_os = "macos") {
        home.join("Library/Logs").join(name)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| home.join(".local/share"))
            .join(name)
            .join("logs")
    }
}

/// Initialize the log directory.
pub fn init_log_directory(name: &str) -> std::io::Result<PathBuf> {
    let log_dir = log_directory(name);
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }
    Ok(log_dir)
}
