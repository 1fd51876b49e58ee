//! [`Shell`] backed by the real operating system.

use arboard::Clipboard;
use std::ffi::OsString;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bug::BugReport;
use crate::env::BuildEnvironment;
use crate::error::{report_failure, ActionError};
use crate::host::{AppWindow, Shell, Windows};
use crate::settings::settings_path;

/// Replaces the default `process::exit` when quitting.
pub type QuitHook = Arc<dyn Fn() + Send + Sync + 'static>;

/// Default browser, system clipboard and process control.
pub struct SystemShell {
    quit_hook: Option<QuitHook>,
}

impl SystemShell {
    pub fn new() -> Self {
        Self { quit_hook: None }
    }

    /// Run `hook` instead of exiting the process, e.g. to stop an event loop.
    pub fn with_quit_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.quit_hook = Some(Arc::new(hook));
        self
    }

    fn with_clipboard<T>(
        &self,
        f: impl FnOnce(&mut Clipboard) -> Result<T, arboard::Error>,
    ) -> Result<T, ActionError> {
        let mut clipboard = Clipboard::new().map_err(|e| ActionError::Clipboard(e.to_string()))?;
        f(&mut clipboard).map_err(|e| ActionError::Clipboard(e.to_string()))
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell for SystemShell {
    fn open_external(&self, url: &str) -> Result<(), ActionError> {
        debug!(url, "Opening in default browser");
        open::that(url).map_err(|e| ActionError::OpenExternal {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_clipboard_text(&self, text: &str) -> Result<(), ActionError> {
        self.with_clipboard(|clipboard| clipboard.set_text(text.to_string()))
    }

    fn clipboard_formats(&self) -> Vec<String> {
        let text = self.with_clipboard(|clipboard| clipboard.get_text()).ok();
        detect_formats(text.as_deref(), || {
            self.with_clipboard(|clipboard| clipboard.get_image().map(|_| ()))
                .is_ok()
        })
    }

    fn relaunch(&self, args: &[OsString]) -> Result<(), ActionError> {
        let exe = std::env::current_exe()?;
        let child = Command::new(&exe).args(args).spawn()?;
        info!(exe = %exe.display(), pid = child.id(), "Spawned new instance");
        Ok(())
    }

    fn quit(&self) {
        match &self.quit_hook {
            Some(hook) => hook(),
            None => {
                info!("Exiting");
                std::process::exit(0);
            }
        }
    }
}

/// Formats on the clipboard: non-empty text wins, otherwise an image is probed.
fn detect_formats(text: Option<&str>, has_image: impl FnOnce() -> bool) -> Vec<String> {
    if text.is_some_and(|text| !text.is_empty()) {
        vec!["text/plain".to_string()]
    } else if has_image() {
        vec!["image/png".to_string()]
    } else {
        Vec::new()
    }
}

/// Secondary "windows" delegated to the OS: the settings file opens in its
/// default editor, documentation and bug reports in the browser.
pub struct SystemWindows {
    env: BuildEnvironment,
    shell: Arc<dyn Shell>,
}

impl SystemWindows {
    pub fn new(env: BuildEnvironment, shell: Arc<dyn Shell>) -> Self {
        Self { env, shell }
    }

    pub fn docs_url(&self) -> String {
        format!("{}#readme", self.env.web_link().trim_end_matches(".git"))
    }
}

impl Windows for SystemWindows {
    fn open_settings(&self, parent: &dyn AppWindow) {
        let path = settings_path();
        debug!(window = %parent.id(), path = %path.display(), "Opening settings");
        if let Err(e) = self.shell.open_external(&path.to_string_lossy()) {
            report_failure("windows.settings", &e);
        }
    }

    fn open_docs(&self, parent: &dyn AppWindow) -> Result<(), ActionError> {
        debug!(window = %parent.id(), "Opening documentation");
        self.shell.open_external(&self.docs_url())
    }

    fn show_about(&self, parent: &dyn AppWindow) {
        info!(
            window = %parent.id(),
            name = %self.env.app_name,
            version = %self.env.app_version,
            build = self.env.build_type.as_str(),
            repository = self.env.web_link(),
            "About"
        );
    }

    fn report_bug(&self) -> Result<(), ActionError> {
        BugReport::new(&self.env).open(self.shell.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Platform;
    use crate::host::headless::HeadlessWindow;
    use crate::host::WindowId;
    use crate::testing::{environment, RecordingShell};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_windows_open_through_shell() {
        let shell = Arc::new(RecordingShell::default());
        let windows = SystemWindows::new(environment(Platform::Linux), shell.clone());
        let window = HeadlessWindow::new(WindowId(1));

        windows.open_docs(window.as_ref()).unwrap();
        windows.report_bug().unwrap();
        windows.show_about(window.as_ref());

        let opened = shell.opened();
        assert_eq!(opened.len(), 2);
        assert_eq!(opened[0], "https://github.com/webshell/webshell#readme");
        assert!(opened[1].contains("/issues/new?"));
    }

    #[test]
    fn test_quit_hook_replaces_exit() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let shell = SystemShell::new().with_quit_hook(move || flag.store(true, Ordering::SeqCst));

        shell.quit();
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(detect_formats(Some("hello"), || panic!("text wins")), vec!["text/plain"]);
        assert_eq!(detect_formats(Some(""), || true), vec!["image/png"]);
        assert_eq!(detect_formats(None, || true), vec!["image/png"]);
        assert!(detect_formats(Some(""), || false).is_empty());
        assert!(detect_formats(None, || false).is_empty());
    }

    #[test]
    fn test_relaunch_spawn_failure_maps_to_relaunch_error() {
        let err: ActionError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, ActionError::Relaunch(_)));
    }
}
