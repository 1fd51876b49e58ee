//! Recording collaborators and a ready-made fixture for builder tests.

use std::ffi::OsString;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Runtime};

use crate::config::BuildType;
use crate::env::{BuildEnvironment, Platform};
use crate::error::ActionError;
use crate::host::headless::{HeadlessHost, HeadlessSurface, HeadlessWindow};
use crate::host::{AppWindow, Services, Shell, WindowId, Windows};
use crate::l10n::Strings;
use crate::menu::bar::MenuBarBuilder;
use crate::menu::context::ContextMenuBuilder;
use crate::menu::tray::{QuitFlag, TrayMenuBuilder};
use crate::settings::{Settings, SettingsStore};
use crate::sidebar::SidebarCoordinator;

pub fn environment(platform: Platform) -> BuildEnvironment {
    BuildEnvironment {
        platform,
        build_type: BuildType::Release,
        settings: Settings::default(),
        strings: Arc::new(Strings::english().unwrap()),
        app_name: "WebShell".to_string(),
        app_version: "0.1.0".to_string(),
        tray_icon: Some("icons/tray.png".to_string()),
        repository: "git+https://github.com/webshell/webshell".to_string(),
        search_url: "https://www.google.com/search?q=".to_string(),
        issue_template: "bug_report.md".to_string(),
    }
}

#[derive(Default)]
pub struct RecordingShell {
    opened: Mutex<Vec<String>>,
    clipboard: Mutex<Vec<String>>,
    formats: Mutex<Vec<String>>,
    relaunches: Mutex<Vec<Vec<OsString>>>,
    fail_relaunch: AtomicBool,
    quits: AtomicUsize,
}

impl RecordingShell {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn clipboard(&self) -> Vec<String> {
        self.clipboard.lock().unwrap().clone()
    }

    pub fn set_clipboard_formats(&self, formats: Vec<String>) {
        *self.formats.lock().unwrap() = formats;
    }

    pub fn relaunches(&self) -> Vec<Vec<OsString>> {
        self.relaunches.lock().unwrap().clone()
    }

    pub fn fail_relaunch(&self, fail: bool) {
        self.fail_relaunch.store(fail, Ordering::SeqCst);
    }

    pub fn quit_count(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

impl Shell for RecordingShell {
    fn open_external(&self, url: &str) -> Result<(), ActionError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn write_clipboard_text(&self, text: &str) -> Result<(), ActionError> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn clipboard_formats(&self) -> Vec<String> {
        self.formats.lock().unwrap().clone()
    }

    fn relaunch(&self, args: &[OsString]) -> Result<(), ActionError> {
        if self.fail_relaunch.load(Ordering::SeqCst) {
            return Err(ActionError::Relaunch(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "executable missing",
            )));
        }
        self.relaunches.lock().unwrap().push(args.to_vec());
        Ok(())
    }

    fn quit(&self) {
        self.quits.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingWindows {
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingWindows {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: &str) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail.load(Ordering::SeqCst) {
            Err(ActionError::Window(format!("{} unavailable", call)))
        } else {
            Ok(())
        }
    }
}

impl Windows for RecordingWindows {
    fn open_settings(&self, _parent: &dyn AppWindow) {
        let _ = self.record("settings");
    }

    fn open_docs(&self, _parent: &dyn AppWindow) -> Result<(), ActionError> {
        self.record("docs")
    }

    fn show_about(&self, _parent: &dyn AppWindow) {
        let _ = self.record("about");
    }

    fn report_bug(&self) -> Result<(), ActionError> {
        self.record("report-bug")
    }
}

pub struct Fixture {
    pub runtime: Runtime,
    pub window: Arc<HeadlessWindow>,
    pub app_window: Arc<dyn AppWindow>,
    pub surface: Arc<HeadlessSurface>,
    pub shell: Arc<RecordingShell>,
    pub windows: Arc<RecordingWindows>,
    pub host: Arc<HeadlessHost>,
    pub services: Services,
}

impl Fixture {
    pub fn new() -> Self {
        let runtime = Builder::new_current_thread().enable_all().build().unwrap();
        let window = HeadlessWindow::new(WindowId(1));
        let app_window: Arc<dyn AppWindow> = window.clone();
        let surface = window.surface();
        let shell = Arc::new(RecordingShell::default());
        let windows = Arc::new(RecordingWindows::default());
        let host = HeadlessHost::new();
        let services = Services {
            shell: shell.clone(),
            windows: windows.clone(),
            host: host.clone(),
            settings: Arc::new(SettingsStore::in_memory(Settings::default())),
            sidebar: Arc::new(SidebarCoordinator::new(runtime.handle().clone())),
            quit: QuitFlag::new(),
        };
        Self {
            runtime,
            window,
            app_window,
            surface,
            shell,
            windows,
            host,
            services,
        }
    }

    pub fn context_builder<'a>(&'a self, env: &'a BuildEnvironment) -> ContextMenuBuilder<'a> {
        ContextMenuBuilder::new(&self.app_window, env, &self.services)
    }

    pub fn tray_builder<'a>(&'a self, env: &'a BuildEnvironment) -> TrayMenuBuilder<'a> {
        TrayMenuBuilder::new(env, &self.services)
    }

    pub fn bar_builder<'a>(&'a self, env: &'a BuildEnvironment) -> MenuBarBuilder<'a> {
        MenuBarBuilder::new(env, &self.services)
    }

    /// Run spawned page updates to completion.
    pub fn settle(&self) {
        self.runtime.block_on(async {
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
        });
    }
}
