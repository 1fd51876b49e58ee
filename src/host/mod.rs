//! Collaborator interfaces consumed by the menu builders.
//!
//! The builders decide structure and wire handlers; everything that touches
//! the windowing system, the web contents or the OS goes through these traits.

pub mod headless;
#[cfg(target_os = "macos")]
pub mod macos;
pub mod registry;
pub mod system;

use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use crate::error::ActionError;
use crate::menu::tray::{ClosePolicy, QuitFlag, TrayMenu};
use crate::menu::MenuNode;
use crate::settings::SettingsStore;
use crate::sidebar::SidebarCoordinator;

/// Identifies a window for per-window state (tray, sidebar toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Handle returned by [`ContentSurface::insert_css`], used to remove that style again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleKey(pub String);

/// Called when the user asks to close a window.
pub type CloseHandler = Arc<dyn Fn() -> ClosePolicy + Send + Sync + 'static>;

/// A top-level window hosting the web application.
pub trait AppWindow: Send + Sync {
    fn id(&self) -> WindowId;
    fn is_visible(&self) -> bool;
    fn is_focused(&self) -> bool;
    fn show(&self);
    fn hide(&self);
    fn focus(&self);
    /// The web contents rendered in this window.
    fn content(&self) -> Arc<dyn ContentSurface>;
    /// Show a transient menu anchored to the window.
    fn popup(&self, menu: MenuNode, x: i32, y: i32);
    /// Install the close interceptor, replacing any previous one.
    fn set_close_handler(&self, handler: CloseHandler);
}

/// The hosted page.
#[async_trait]
pub trait ContentSurface: Send + Sync {
    async fn insert_css(&self, css: &str) -> Result<StyleKey, ActionError>;
    async fn remove_inserted_css(&self, key: &StyleKey) -> Result<(), ActionError>;
    fn replace_misspelling(&self, word: &str);
    fn add_word_to_dictionary(&self, word: &str);
    fn copy_image_at(&self, x: i32, y: i32);
    fn inspect_element(&self, x: i32, y: i32);
}

/// OS primitives.
pub trait Shell: Send + Sync {
    fn open_external(&self, url: &str) -> Result<(), ActionError>;
    fn write_clipboard_text(&self, text: &str) -> Result<(), ActionError>;
    /// Formats currently available on the clipboard; empty when it holds nothing.
    fn clipboard_formats(&self) -> Vec<String>;
    /// Start a new instance of the executable with `args`.
    fn relaunch(&self, args: &[OsString]) -> Result<(), ActionError>;
    fn quit(&self);
}

/// Secondary windows and panels.
pub trait Windows: Send + Sync {
    fn open_settings(&self, parent: &dyn AppWindow);
    fn open_docs(&self, parent: &dyn AppWindow) -> Result<(), ActionError>;
    fn show_about(&self, parent: &dyn AppWindow);
    fn report_bug(&self) -> Result<(), ActionError>;
}

/// Where built menus end up. Installing replaces whatever was there before.
pub trait MenuHost: Send + Sync {
    fn set_application_menu(&self, menu: MenuNode);
    fn set_tray(&self, window: WindowId, tray: TrayMenu);
    /// Run `task` on the UI thread once the current event, such as an open
    /// menu's tracking loop, has finished.
    fn defer(&self, task: Box<dyn FnOnce() + Send>);
}

/// Everything the builders call into, bundled for cheap cloning into handlers.
#[derive(Clone)]
pub struct Services {
    pub shell: Arc<dyn Shell>,
    pub windows: Arc<dyn Windows>,
    pub host: Arc<dyn MenuHost>,
    pub settings: Arc<SettingsStore>,
    pub sidebar: Arc<SidebarCoordinator>,
    pub quit: QuitFlag,
}

impl Services {
    /// Begin the quit sequence: mark it for the close interceptors, then ask the shell to quit.
    pub fn quit(&self) {
        self.quit.begin();
        self.shell.quit();
    }
}
