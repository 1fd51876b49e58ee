//! Localized menu labels.
//!
//! Labels are looked up by dotted path (`tray.toggle`, `menubar.file.relaunch`).
//! A translation may be partial; missing entries fall back to English and,
//! failing that, to the path itself.

use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::L10nError;

const EN_JSON: &str = include_str!("../strings/en.json");

#[derive(Debug, Clone)]
pub struct Strings {
    table: Value,
    fallback: Option<Box<Strings>>,
}

impl Strings {
    /// The built-in English table.
    pub fn english() -> Result<Self, L10nError> {
        Self::from_json(EN_JSON)
    }

    /// Parse a string table from JSON.
    pub fn from_json(json: &str) -> Result<Self, L10nError> {
        let table: Value = serde_json::from_str(json)?;
        if !table.is_object() {
            return Err(L10nError::NotAnObject);
        }
        Ok(Self {
            table,
            fallback: None,
        })
    }

    /// Parse a translation that falls back to English for missing labels.
    pub fn translation(json: &str) -> Result<Self, L10nError> {
        let mut strings = Self::from_json(json)?;
        strings.fallback = Some(Box::new(Self::english()?));
        Ok(strings)
    }

    /// The translation at `path`, or English when none is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, L10nError> {
        match path {
            Some(path) => {
                info!(path = %path.display(), "Loading translation");
                Self::translation(&std::fs::read_to_string(path)?)
            }
            None => Self::english(),
        }
    }

    fn lookup(&self, path: &str) -> Option<&str> {
        path.split('.')
            .try_fold(&self.table, |node, key| node.get(key))
            .and_then(Value::as_str)
            .or_else(|| self.fallback.as_ref().and_then(|f| f.lookup(path)))
    }

    /// Label for `path`.
    pub fn get(&self, path: &str) -> String {
        match self.lookup(path) {
            Some(label) => label.to_string(),
            None => {
                warn!("Missing localized string '{}'", path);
                path.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_lookup() {
        let strings = Strings::english().unwrap();
        assert_eq!(strings.get("tray.quit"), "Quit");
        assert_eq!(strings.get("menubar.file.relaunch"), "Relaunch");
        assert_eq!(strings.get("help.bugs"), "Report a bug");
    }

    #[test]
    fn test_missing_key_returns_path() {
        let strings = Strings::english().unwrap();
        assert_eq!(strings.get("tray.nothing"), "tray.nothing");
        assert_eq!(strings.get("tray"), "tray");
    }

    #[test]
    fn test_translation_falls_back_to_english() {
        let strings = Strings::translation(r#"{"tray":{"quit":"Zakończ"}}"#).unwrap();
        assert_eq!(strings.get("tray.quit"), "Zakończ");
        assert_eq!(strings.get("windows.about"), "About");
    }

    #[test]
    fn test_load_translation_file() {
        let dir = std::env::temp_dir().join(format!("webshell-l10n-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("de.json");
        std::fs::write(&path, r#"{"tray":{"quit":"Beenden"}}"#).unwrap();

        let strings = Strings::load(Some(&path)).unwrap();
        assert_eq!(strings.get("tray.quit"), "Beenden");
        assert_eq!(strings.get("help.bugs"), "Report a bug");

        let english = Strings::load(None).unwrap();
        assert_eq!(english.get("tray.quit"), "Quit");

        assert!(matches!(
            Strings::load(Some(&dir.join("missing.json"))),
            Err(L10nError::Io(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            Strings::from_json("[1, 2]"),
            Err(L10nError::NotAnObject)
        ));
        assert!(matches!(Strings::from_json("{"), Err(L10nError::Parse(_))));
    }
}
