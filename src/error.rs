//! Error types for the webshell-menus crate.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.
//! Menu actions never propagate their failures to the host: they go through [`run_action`],
//! which logs them through the common failure sink.

use thiserror::Error;
use tracing::error;

/// Failure of a collaborator call made by a menu action.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to open {url}: {reason}")]
    OpenExternal { url: String, reason: String },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Style injection failed: {0}")]
    Style(String),

    #[error("Bug report failed: {0}")]
    BugReport(String),

    #[error("Relaunch failed: {0}")]
    Relaunch(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ActionError {
    /// Returns a user-friendly message for display in the UI.
    pub fn user_message(&self) -> &str {
        match self {
            Self::OpenExternal { .. } => "Could not open the link in the default browser.",
            Self::Clipboard(_) => "Could not access the clipboard.",
            Self::Window(_) => "Could not open the window.",
            Self::Style(_) => "Could not change the page layout.",
            Self::BugReport(_) => "Could not open the bug report form.",
            Self::Relaunch(_) => "Could not restart the application.",
            Self::Url(_) => "The link is not valid.",
        }
    }
}

/// Configuration and settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Localization errors.
#[derive(Error, Debug)]
pub enum L10nError {
    #[error("Invalid string table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("String table root must be an object")]
    NotAnObject,

    #[error("Failed to read string table: {0}")]
    Io(#[from] std::io::Error),
}

/// Common failure sink for recoverable action failures.
pub fn report_failure(action: &str, err: &ActionError) {
    error!(action, "{} ({})", err, err.user_message());
}

/// Run a collaborator call on behalf of a menu action.
///
/// The result is returned unchanged; failures are additionally reported.
pub fn run_action<F>(action: &str, f: F) -> Result<(), ActionError>
where
    F: FnOnce() -> Result<(), ActionError>,
{
    let result = f();
    if let Err(e) = &result {
        report_failure(action, e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = ActionError::OpenExternal {
            url: "https://example.com".into(),
            reason: "no handler".into(),
        };
        assert_eq!(
            err.user_message(),
            "Could not open the link in the default browser."
        );

        let err = ActionError::Style("surface gone".into());
        assert_eq!(err.user_message(), "Could not change the page layout.");
    }

    #[test]
    fn test_run_action_passes_result_through() {
        assert!(run_action("noop", || Ok(())).is_ok());

        let result = run_action("docs", || Err(ActionError::Window("missing".into())));
        assert!(matches!(result, Err(ActionError::Window(_))));
    }
}
